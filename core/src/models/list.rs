use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::hydrate::{hydrate_many, Details, Model, Strategy};
use crate::model_fields;
use crate::payload::unwrap_collection;

use super::Entity;

/// A curated, optionally ranked list of entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct List {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_ranked: Option<String>,
    pub updated_at: Option<String>,
    pub uri: Option<String>,
    pub api_uri: Option<String>,
    pub details: Details,
    pub entities: Vec<Entity>,
}

impl Model for List {
    const NAME: &'static str = "List";
    const PLURAL: &'static str = "Lists";
    const REQUIRED: &'static [&'static str] = &["id", "name", "is_ranked"];
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[("Entities", attach_entities)];

    model_fields!(id, name, description, is_ranked, updated_at, uri, api_uri);
}

fn attach_entities(list: &mut List, value: Value) -> Result<()> {
    let payloads = unwrap_collection(Some(value), Entity::NAME)?;
    list.entities = hydrate_many(payloads)?;
    Ok(())
}
