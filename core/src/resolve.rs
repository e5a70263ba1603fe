//! Cross-reference resolution over a whole `Response.Data` section.
//!
//! # Design
//! Field-level cross references (`Entity1`, `Relationships`, ...) are handled
//! by each model's strategy table during hydration. The functions here cover
//! the endpoint shapes where related models arrive as *siblings* of the
//! primary model inside `Response.Data` and have to be stitched onto it
//! afterwards. Each takes the `Data` mapping by value and returns fully
//! hydrated, owned models.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::hydrate::{hydrate, hydrate_many, hydrate_map, Details, Model};
use crate::models::{Entity, List, Relationship};
use crate::payload::{kind_of, take_collection, take_object, unwrap_collection};

/// Wrapper name for entities related to the queried one.
pub const RELATED_ENTITIES: &str = "RelatedEntities";
/// Per-relationship key holding the entity on the far side.
pub const RELATED_ENTITY: &str = "RelatedEntity";

/// `Data.<Model>` as a single model.
pub fn single<M: Model>(mut data: Map<String, Value>) -> Result<M> {
    hydrate_map(take_object(&mut data, M::NAME)?)
}

/// `Data.<Plural>.<Model>` as an ordered sequence; absent means empty.
pub fn many<M: Model>(mut data: Map<String, Value>) -> Result<Vec<M>> {
    hydrate_many(take_collection(&mut data, M::PLURAL, M::NAME)?)
}

/// Plain records under `Data.<plural>.<singular>`, for lookup tables such as
/// relationship categories that have no model of their own.
pub fn records(mut data: Map<String, Value>, plural: &str, singular: &str) -> Result<Vec<Details>> {
    take_collection(&mut data, plural, singular)?
        .into_iter()
        .map(|record| match record {
            Value::Object(map) => Ok(map),
            other => Err(ApiError::malformed(format!(
                "{singular} record is {}, expected an object",
                kind_of(&other)
            ))),
        })
        .collect()
}

/// The queried entity with its sibling relationships attached.
pub fn entity_with_relationships(mut data: Map<String, Value>) -> Result<Entity> {
    let mut entity: Entity = hydrate_map(take_object(&mut data, Entity::NAME)?)?;
    entity.relationships = hydrate_many(take_collection(
        &mut data,
        Relationship::PLURAL,
        Relationship::NAME,
    )?)?;
    Ok(entity)
}

/// The queried entity with its sibling related entities attached. Each
/// related entity carries its connecting relationships through its own
/// `Relationships` key.
pub fn entity_with_related_entities(mut data: Map<String, Value>) -> Result<Entity> {
    let mut entity: Entity = hydrate_map(take_object(&mut data, Entity::NAME)?)?;
    entity.related_entities =
        hydrate_many(take_collection(&mut data, RELATED_ENTITIES, Entity::NAME)?)?;
    Ok(entity)
}

/// A list with its sibling entities attached.
pub fn list_with_entities(mut data: Map<String, Value>) -> Result<List> {
    let mut list: List = hydrate_map(take_object(&mut data, List::NAME)?)?;
    list.entities = hydrate_many(take_collection(&mut data, Entity::PLURAL, Entity::NAME)?)?;
    Ok(list)
}

/// Relationships of `queried_id`, each with its `RelatedEntity` placed in
/// the endpoint slot whose id it matches.
///
/// A self-relationship gets a copy of the related entity in both slots.
pub fn relationships_with_related_entities(
    mut data: Map<String, Value>,
    queried_id: &str,
) -> Result<Vec<Relationship>> {
    take_collection(&mut data, Relationship::PLURAL, Relationship::NAME)?
        .into_iter()
        .map(|payload| {
            let mut map = match payload {
                Value::Object(map) => map,
                other => {
                    return Err(ApiError::malformed(format!(
                        "Relationship is {}, expected an object",
                        kind_of(&other)
                    )))
                }
            };
            let related = map.remove(RELATED_ENTITY);
            let mut rel: Relationship = hydrate_map(map)?;
            match related {
                None | Some(Value::Null) => {}
                Some(payload) => place_related(&mut rel, hydrate(payload)?, queried_id),
            }
            Ok(rel)
        })
        .collect()
}

fn place_related(rel: &mut Relationship, related: Entity, queried_id: &str) {
    let entity1_id = rel.entity1_id.as_deref();
    let entity2_id = rel.entity2_id.as_deref();
    let related_id = related.id.as_deref();

    let self_relationship = entity1_id == Some(queried_id) && entity2_id == Some(queried_id);
    let fills_entity1 = related_id.is_some() && related_id == entity1_id;
    let fills_entity2 = related_id.is_some() && related_id == entity2_id;

    if self_relationship {
        rel.entity1 = Some(related.clone());
        rel.entity2 = Some(related);
    } else if fills_entity1 {
        rel.entity1 = Some(related);
    } else if fills_entity2 {
        rel.entity2 = Some(related);
    } else {
        warn!(
            "related entity {:?} matches neither end of relationship {:?}",
            related.id, rel.id
        );
    }
}

/// Related entities grouped by relationship category id.
///
/// Each section of `Data.Categories.Category` carries a `category_id` and an
/// `Entities` wrapper; repeated categories are concatenated in payload order.
pub fn related_entities_by_category(
    mut data: Map<String, Value>,
) -> Result<BTreeMap<u32, Vec<Entity>>> {
    let mut grouped: BTreeMap<u32, Vec<Entity>> = BTreeMap::new();
    for section in take_collection(&mut data, "Categories", "Category")? {
        let Value::Object(mut section) = section else {
            return Err(ApiError::malformed("Category section is not an object"));
        };
        let category_id = category_id(section.remove("category_id"))?;
        let entities: Vec<Entity> =
            hydrate_many(unwrap_collection(section.remove(Entity::PLURAL), Entity::NAME)?)?;
        grouped.entry(category_id).or_default().extend(entities);
    }
    Ok(grouped)
}

fn category_id(value: Option<Value>) -> Result<u32> {
    let parsed = match &value {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::malformed(format!("invalid category_id: {value:?}")))
}
