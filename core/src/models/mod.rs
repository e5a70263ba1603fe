//! Domain models returned by the service.
//!
//! Every model is built fresh from one payload by the hydration engine and
//! owns its embedded models outright; the same logical entity fetched twice
//! yields two unrelated values.

mod entity;
mod image;
mod list;
mod relationship;

pub use entity::Entity;
pub use image::Image;
pub use list::List;
pub use relationship::Relationship;
