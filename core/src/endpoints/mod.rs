//! Per-model endpoint namespaces.
//!
//! Each method builds a path, performs one round trip through the owning
//! client's session, and hands `Response.Data` to [`crate::resolve`].

mod entity;
mod image;
mod list;
mod relationship;

pub use entity::EntityApi;
pub use image::ImageApi;
pub use list::ListApi;
pub use relationship::RelationshipApi;

/// `[1, 2, 3]` becomes `"1,2,3"`.
fn join_ids(ids: &[impl ToString]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
