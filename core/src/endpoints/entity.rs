use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::client::{Params, Session};
use crate::error::Result;
use crate::hydrate::Details;
use crate::http::Transport;
use crate::models::{Entity, Relationship};
use crate::resolve;

use super::join_ids;

/// Entity endpoints, bound to one client.
pub struct EntityApi<T> {
    session: Arc<Session<T>>,
}

impl<T: Transport> EntityApi<T> {
    pub(crate) fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }

    pub fn get(&self, id: impl Display) -> Result<Entity> {
        let data = self.session.fetch(&format!("entity/{id}.json"), &Params::new())?;
        resolve::single(data)
    }

    /// The entity with `types` and `Aliases` in its details.
    pub fn details(&self, id: impl Display) -> Result<Entity> {
        let data = self
            .session
            .fetch(&format!("entity/{id}/details.json"), &Params::new())?;
        resolve::single(data)
    }

    /// Entities for the given ids in one request. Unknown ids are skipped by
    /// the service; if none match the result is empty.
    pub fn get_many(&self, ids: &[impl ToString], details: bool) -> Result<Vec<Entity>> {
        let mut params = Params::new().with("ids", join_ids(ids));
        if details {
            params.insert("details", 1);
        }
        let data = self.session.fetch("batch/entities.json", &params)?;
        resolve::many(data)
    }

    /// The entity with `relationships` populated. Accepts `num`, `page`,
    /// `cat_ids`, `order` and `is_current`.
    pub fn get_with_relationships(&self, id: impl Display, params: &Params) -> Result<Entity> {
        let data = self
            .session
            .fetch(&format!("entity/{id}/relationships.json"), params)?;
        resolve::entity_with_relationships(data)
    }

    /// The entity with `related_entities` populated, each carrying the
    /// relationships that connect it to this one.
    pub fn get_with_related_entities(&self, id: impl Display, params: &Params) -> Result<Entity> {
        let data = self
            .session
            .fetch(&format!("entity/{id}/related.json"), params)?;
        resolve::entity_with_related_entities(data)
    }

    /// Relationships of the entity with the far-side entity embedded in the
    /// matching `entity1`/`entity2` slot.
    pub fn relationships_with_related_entities(
        &self,
        id: impl Display,
        params: &Params,
    ) -> Result<Vec<Relationship>> {
        let id = id.to_string();
        let data = self
            .session
            .fetch(&format!("entity/{id}/relationships/related.json"), params)?;
        resolve::relationships_with_related_entities(data, &id)
    }

    pub fn related_entities_by_category(
        &self,
        id: impl Display,
        params: &Params,
    ) -> Result<BTreeMap<u32, Vec<Entity>>> {
        let data = self
            .session
            .fetch(&format!("entity/{id}/related/categories.json"), params)?;
        resolve::related_entities_by_category(data)
    }

    /// All entity types known to the service (`id`, `name`, ...).
    pub fn types(&self) -> Result<Vec<Details>> {
        let data = self.session.fetch("entities/types.json", &Params::new())?;
        resolve::records(data, "EntityTypes", "EntityType")
    }

    /// Names of the given type ids, in the order requested. Unknown ids are
    /// skipped.
    pub fn type_names(&self, type_ids: &[impl ToString]) -> Result<Vec<String>> {
        let types = self.types()?;
        Ok(type_ids
            .iter()
            .map(ToString::to_string)
            .filter_map(|wanted| {
                types
                    .iter()
                    .find(|t| record_id(t).as_deref() == Some(wanted.as_str()))
                    .and_then(|t| t.get("name"))
                    .and_then(|name| name.as_str())
                    .map(str::to_string)
            })
            .collect())
    }
}

/// Record ids arrive as strings or numbers.
fn record_id(record: &Details) -> Option<String> {
    match record.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
