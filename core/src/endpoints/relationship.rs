use std::fmt::Display;
use std::sync::Arc;

use crate::client::{Params, Session};
use crate::error::Result;
use crate::hydrate::Details;
use crate::http::Transport;
use crate::models::Relationship;
use crate::resolve;

use super::join_ids;

/// Relationship endpoints, bound to one client.
pub struct RelationshipApi<T> {
    session: Arc<Session<T>>,
}

impl<T: Transport> RelationshipApi<T> {
    pub(crate) fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }

    /// The relationship with both endpoint entities embedded.
    pub fn get(&self, id: impl Display) -> Result<Relationship> {
        let data = self
            .session
            .fetch(&format!("relationship/{id}.json"), &Params::new())?;
        resolve::single(data)
    }

    /// Like [`get`](Self::get), plus category-specific fields (for example
    /// `is_executive`, `is_board`) in details.
    pub fn get_with_details(&self, id: impl Display) -> Result<Relationship> {
        let data = self
            .session
            .fetch(&format!("relationship/{id}/details.json"), &Params::new())?;
        resolve::single(data)
    }

    pub fn get_many(&self, ids: &[impl ToString], details: bool) -> Result<Vec<Relationship>> {
        let mut params = Params::new().with("ids", join_ids(ids));
        if details {
            params.insert("details", 1);
        }
        let data = self.session.fetch("batch/relationships.json", &params)?;
        resolve::many(data)
    }

    /// The relationship categories (`id`, `name`, ...), in service order.
    pub fn categories(&self) -> Result<Vec<Details>> {
        let data = self
            .session
            .fetch("relationships/categories.json", &Params::new())?;
        resolve::records(data, "RelationshipCategories", "RelationshipCategory")
    }

    /// Relationships connecting two entities in either direction, optionally
    /// limited to some categories.
    pub fn between_entities(
        &self,
        entity1_id: impl Display,
        entity2_id: impl Display,
        cat_ids: &[u32],
    ) -> Result<Vec<Relationship>> {
        let mut params = Params::new();
        if !cat_ids.is_empty() {
            params.insert("cat_ids", join_ids(cat_ids));
        }
        let data = self
            .session
            .fetch(&format!("relationships/{entity1_id};{entity2_id}.json"), &params)?;
        resolve::many(data)
    }
}
