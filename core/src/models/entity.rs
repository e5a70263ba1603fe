use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::hydrate::{hydrate_many, Details, Model, Strategy};
use crate::model_fields;
use crate::payload::{one_or_many, unwrap_collection};

use super::Relationship;

/// A person or organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entity {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub primary_type: Option<String>,
    pub parent_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<String>,
    pub website: Option<String>,
    pub uri: Option<String>,
    pub api_uri: Option<String>,
    pub updated_at: Option<String>,
    pub details: Details,
    /// Populated only by endpoints that return relationships.
    pub relationships: Vec<Relationship>,
    /// Populated only by endpoints that return related entities.
    pub related_entities: Vec<Entity>,
}

impl Entity {
    /// Type names from `details["types"]`, if the payload carried them.
    pub fn types(&self) -> Vec<&str> {
        string_items(self.details.get("types"))
    }

    /// Alternate names from `details["Aliases"]`.
    pub fn aliases(&self) -> Vec<&str> {
        string_items(self.details.get("Aliases"))
    }
}

impl Model for Entity {
    const NAME: &'static str = "Entity";
    const PLURAL: &'static str = "Entities";
    const REQUIRED: &'static [&'static str] = &["id", "name", "primary_type", "uri", "api_uri"];
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[
        ("types", split_types),
        ("Aliases", unwrap_aliases),
        ("Relationships", attach_relationships),
    ];

    model_fields!(
        id,
        name,
        description,
        summary,
        primary_type,
        parent_id,
        start_date,
        end_date,
        is_current,
        website,
        uri,
        api_uri,
        updated_at,
    );
}

/// `"Org,Business"` becomes `["Org", "Business"]`.
fn split_types(entity: &mut Entity, value: Value) -> Result<()> {
    let types = match value {
        Value::String(joined) => Value::Array(
            joined
                .split(',')
                .map(|name| Value::String(name.to_string()))
                .collect(),
        ),
        Value::Null => Value::Array(Vec::new()),
        other => other,
    };
    entity.details.insert("types".to_string(), types);
    Ok(())
}

/// `{"Alias": "x"}` or `{"Alias": ["x", "y"]}` becomes a plain sequence.
fn unwrap_aliases(entity: &mut Entity, value: Value) -> Result<()> {
    let aliases = match value {
        Value::Object(mut wrapper) => Value::Array(one_or_many(wrapper.remove("Alias"))),
        Value::Null => Value::Array(Vec::new()),
        other => other,
    };
    entity.details.insert("Aliases".to_string(), aliases);
    Ok(())
}

fn attach_relationships(entity: &mut Entity, value: Value) -> Result<()> {
    let payloads = unwrap_collection(Some(value), Relationship::NAME)?;
    entity.relationships = hydrate_many(payloads)?;
    Ok(())
}

fn string_items(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(single)) => vec![single.as_str()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrate::hydrate;
    use serde_json::json;

    #[test]
    fn comma_joined_types_are_split() {
        let entity: Entity = hydrate(json!({
            "id": "1", "name": "Acme", "primary_type": "Org", "uri": "u", "api_uri": "au",
            "types": "Org,Business",
        }))
        .unwrap();
        assert_eq!(entity.details["types"], json!(["Org", "Business"]));
        assert_eq!(entity.types(), ["Org", "Business"]);
        assert!(entity.is_valid());
    }

    #[test]
    fn single_alias_is_unwrapped_into_a_sequence() {
        let entity: Entity = hydrate(json!({"id": "1", "Aliases": {"Alias": "Acme Inc"}})).unwrap();
        assert_eq!(entity.details["Aliases"], json!(["Acme Inc"]));
    }

    #[test]
    fn multiple_aliases_keep_their_order() {
        let entity: Entity =
            hydrate(json!({"id": "1", "Aliases": {"Alias": ["Acme Inc", "Acme Corp"]}})).unwrap();
        assert_eq!(entity.aliases(), ["Acme Inc", "Acme Corp"]);
    }

    #[test]
    fn embedded_relationships_are_hydrated() {
        let entity: Entity = hydrate(json!({
            "id": "1",
            "Relationships": {"Relationship": {"id": "10", "entity1_id": "1", "entity2_id": "2", "category_id": "1"}},
        }))
        .unwrap();
        assert_eq!(entity.relationships.len(), 1);
        assert_eq!(entity.relationships[0].id.as_deref(), Some("10"));
        assert!(!entity.details.contains_key("Relationships"));
    }

    #[test]
    fn alias_key_match_is_case_sensitive() {
        let entity: Entity = hydrate(json!({"id": "1", "aliases": "x"})).unwrap();
        assert_eq!(entity.details["aliases"], json!("x"));
    }
}
