use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::hydrate::{hydrate, Details, Model, Strategy};
use crate::model_fields;

use super::Entity;

/// A directed connection between two entities.
///
/// `entity1`/`entity2` follow the fixed ordering of `entity1_id`/`entity2_id`;
/// they are snapshots owned by this relationship and may carry fewer fields
/// than the same entity fetched on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relationship {
    pub id: Option<String>,
    pub entity1_id: Option<String>,
    pub entity2_id: Option<String>,
    pub category_id: Option<String>,
    pub description1: Option<String>,
    pub description2: Option<String>,
    pub amount: Option<String>,
    pub goods: Option<String>,
    pub notes: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_current: Option<String>,
    pub uri: Option<String>,
    pub api_uri: Option<String>,
    pub updated_at: Option<String>,
    pub details: Details,
    pub entity1: Option<Entity>,
    pub entity2: Option<Entity>,
}

impl Relationship {
    /// True when both ends are the same entity.
    pub fn is_self_relationship(&self) -> bool {
        self.entity1_id.is_some() && self.entity1_id == self.entity2_id
    }

    /// The end that is not `entity_id`, if `entity_id` is one of the ends.
    pub fn other_end(&self, entity_id: &str) -> Option<&Entity> {
        if self.entity1_id.as_deref() == Some(entity_id) {
            self.entity2.as_ref()
        } else if self.entity2_id.as_deref() == Some(entity_id) {
            self.entity1.as_ref()
        } else {
            None
        }
    }
}

impl Model for Relationship {
    const NAME: &'static str = "Relationship";
    const PLURAL: &'static str = "Relationships";
    const REQUIRED: &'static [&'static str] = &["id", "entity1_id", "entity2_id", "category_id"];
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] =
        &[("Entity1", attach_entity1), ("Entity2", attach_entity2)];

    model_fields!(
        id,
        entity1_id,
        entity2_id,
        category_id,
        description1,
        description2,
        amount,
        goods,
        notes,
        start_date,
        end_date,
        is_current,
        uri,
        api_uri,
        updated_at,
    );
}

fn attach_entity1(rel: &mut Relationship, value: Value) -> Result<()> {
    rel.entity1 = embedded_entity(value)?;
    Ok(())
}

fn attach_entity2(rel: &mut Relationship, value: Value) -> Result<()> {
    rel.entity2 = embedded_entity(value)?;
    Ok(())
}

fn embedded_entity(value: Value) -> Result<Option<Entity>> {
    match value {
        Value::Null => Ok(None),
        payload => hydrate(payload).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_endpoints() -> Relationship {
        hydrate(json!({
            "id": "1",
            "entity1_id": "1",
            "entity2_id": "2",
            "category_id": "5",
            "Entity1": {"id": "1", "name": "Walmart", "primary_type": "Org", "uri": "u1", "api_uri": "a1"},
            "Entity2": {"id": "2", "name": "Alice Walton", "primary_type": "Person", "uri": "u2", "api_uri": "a2"},
        }))
        .unwrap()
    }

    #[test]
    fn embedded_endpoints_match_their_ids() {
        let rel = with_endpoints();
        let entity1 = rel.entity1.as_ref().unwrap();
        let entity2 = rel.entity2.as_ref().unwrap();
        assert_eq!(entity1.id, rel.entity1_id);
        assert_eq!(entity2.id, rel.entity2_id);
        assert!(entity1.is_valid() && entity2.is_valid());
        assert!(rel.is_valid());
        assert!(rel.details.is_empty());
    }

    #[test]
    fn other_end_follows_direction() {
        let rel = with_endpoints();
        assert_eq!(rel.other_end("1").unwrap().id.as_deref(), Some("2"));
        assert_eq!(rel.other_end("2").unwrap().id.as_deref(), Some("1"));
        assert!(rel.other_end("3").is_none());
        assert!(!rel.is_self_relationship());
    }

    #[test]
    fn category_specific_fields_go_to_details() {
        let rel: Relationship = hydrate(json!({"id": "23", "is_executive": "1", "is_board": "0"})).unwrap();
        assert_eq!(rel.details["is_executive"], json!("1"));
        assert_eq!(rel.details["is_board"], json!("0"));
    }

    #[test]
    fn null_endpoint_leaves_slot_empty() {
        let rel: Relationship = hydrate(json!({"id": "1", "Entity1": null})).unwrap();
        assert!(rel.entity1.is_none());
    }

    #[test]
    fn malformed_endpoint_fails_hydration() {
        let result = hydrate::<Relationship>(json!({"id": "1", "Entity2": ["x"]}));
        assert!(result.is_err());
    }
}
