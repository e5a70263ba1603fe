use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// API key accepted by [`app`].
pub const API_KEY: &str = "test-key";

pub type Record = Map<String, Value>;

/// Fixture data served by the mock, in the service's flat record form.
///
/// Entities carry `types` and `aliases` as arrays, relationships carry their
/// category-specific fields under `extra`, lists carry `entity_ids`, and
/// images carry the `entity_id` they belong to. Handlers reshape these into
/// the service's envelope on the way out.
#[derive(Clone, Debug, Deserialize)]
pub struct Fixtures {
    pub entities: Vec<Record>,
    pub relationships: Vec<Record>,
    pub lists: Vec<Record>,
    pub images: Vec<Record>,
    pub categories: Vec<Value>,
    pub entity_types: Vec<Value>,
}

impl Fixtures {
    pub fn bundled() -> Self {
        serde_json::from_str(include_str!("../fixtures.json"))
            .expect("bundled fixtures.json is valid")
    }
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    fixtures: Arc<Fixtures>,
}

type QueryParams = Query<HashMap<String, String>>;
type Reply = Result<Json<Value>, (StatusCode, String)>;

pub fn app() -> Router {
    app_with(API_KEY, Fixtures::bundled())
}

pub fn app_with(api_key: &str, fixtures: Fixtures) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        fixtures: Arc::new(fixtures),
    };
    Router::new()
        .route("/entity/{id}", get(entity))
        .route("/entity/{id}/details.json", get(entity_details))
        .route("/entity/{id}/relationships.json", get(entity_relationships))
        .route(
            "/entity/{id}/relationships/related.json",
            get(relationships_with_related),
        )
        .route("/entity/{id}/related.json", get(related_entities))
        .route("/entity/{id}/related/categories.json", get(related_by_category))
        .route("/entity/{id}/images.json", get(entity_images))
        .route("/entities/types.json", get(entity_types))
        .route("/batch/entities.json", get(batch_entities))
        .route("/batch/relationships.json", get(batch_relationships))
        .route("/relationship/{id}", get(relationship))
        .route("/relationship/{id}/details.json", get(relationship_details))
        .route("/relationships/categories.json", get(categories))
        .route("/relationships/{pair}", get(between_entities))
        .route("/list/{id}", get(list))
        .route("/list/{id}/entities.json", get(list_entities))
        .fallback(unrecognized)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    info!("mock LittleSis API listening on {}", listener.local_addr()?);
    axum::serve(listener, app()).await
}

// --- entities ---

async fn entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let entity = state.entity(json_id(&id)?)?;
    Ok(envelope(json!({ "Entity": entity_base(entity) })))
}

async fn entity_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let entity = state.entity(&id)?;
    Ok(envelope(json!({ "Entity": entity_detailed(entity) })))
}

async fn entity_relationships(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let entity = state.entity(&id)?;
    let rels = state
        .relationships_of(&id, &q)
        .into_iter()
        .map(|r| Value::Object(relationship_base(r)))
        .collect();
    Ok(envelope(json!({
        "Entity": entity_base(entity),
        "Relationships": collection("Relationship", rels),
    })))
}

async fn relationships_with_related(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    state.entity(&id)?;
    let mut rels = Vec::new();
    for r in state.relationships_of(&id, &q) {
        let other = other_end(r, &id);
        let mut rel = relationship_base(r);
        rel.insert("RelatedEntity".to_string(), entity_base(state.entity(other)?));
        rels.push(Value::Object(rel));
    }
    Ok(envelope(json!({ "Relationships": collection("Relationship", rels) })))
}

async fn related_entities(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let entity = state.entity(&id)?;

    let mut order: Vec<&str> = Vec::new();
    let mut connecting: HashMap<&str, Vec<Value>> = HashMap::new();
    for r in state.relationships_of(&id, &q) {
        let other = other_end(r, &id);
        if other == id {
            continue;
        }
        if !connecting.contains_key(other) {
            order.push(other);
        }
        connecting
            .entry(other)
            .or_default()
            .push(Value::Object(relationship_base(r)));
    }

    let mut related = Vec::new();
    for other in order {
        let mut e = entity_base(state.entity(other)?);
        let rels = connecting.remove(other).unwrap_or_default();
        e["Relationships"] = collection("Relationship", rels);
        related.push(e);
    }
    Ok(envelope(json!({
        "Entity": entity_base(entity),
        "RelatedEntities": collection("Entity", related),
    })))
}

async fn related_by_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    state.entity(&id)?;

    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
    for r in state.relationships_of(&id, &q) {
        let other = other_end(r, &id);
        if other == id {
            continue;
        }
        let category = field(r, "category_id");
        let members = grouped.entry(category).or_insert_with(|| {
            order.push(category);
            Vec::new()
        });
        if !members.contains(&other) {
            members.push(other);
        }
    }

    let mut sections = Vec::new();
    for category in order {
        let mut entities = Vec::new();
        for other in grouped.remove(category).unwrap_or_default() {
            entities.push(entity_base(state.entity(other)?));
        }
        sections.push(json!({
            "category_id": category,
            "Entities": collection("Entity", entities),
        }));
    }
    Ok(envelope(json!({ "Categories": collection("Category", sections) })))
}

async fn entity_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    state.entity(&id)?;
    let images = state
        .fixtures
        .images
        .iter()
        .filter(|image| field(image, "entity_id") == id)
        .map(|image| {
            let mut image = image.clone();
            image.remove("entity_id");
            Value::Object(image)
        })
        .collect();
    Ok(envelope(json!({ "Images": collection("Image", images) })))
}

async fn entity_types(State(state): State<AppState>, Query(q): QueryParams) -> Reply {
    state.authorize(&q)?;
    let types = state.fixtures.entity_types.clone();
    Ok(envelope(json!({ "EntityTypes": collection("EntityType", types) })))
}

async fn batch_entities(State(state): State<AppState>, Query(q): QueryParams) -> Reply {
    state.authorize(&q)?;
    let details = q.get("details").map(String::as_str) == Some("1");
    let entities = requested_ids(&q)
        .filter_map(|id| state.entity(id).ok())
        .map(|e| if details { entity_detailed(e) } else { entity_base(e) })
        .collect();
    Ok(envelope(json!({ "Entities": collection("Entity", entities) })))
}

// --- relationships ---

async fn relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let rel = state.relationship(json_id(&id)?)?;
    Ok(envelope(json!({ "Relationship": state.with_endpoints(rel, false)? })))
}

async fn relationship_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let rel = state.relationship(&id)?;
    Ok(envelope(json!({ "Relationship": state.with_endpoints(rel, true)? })))
}

async fn batch_relationships(State(state): State<AppState>, Query(q): QueryParams) -> Reply {
    state.authorize(&q)?;
    let details = q.get("details").map(String::as_str) == Some("1");
    let mut rels = Vec::new();
    for id in requested_ids(&q) {
        if let Ok(rel) = state.relationship(id) {
            rels.push(state.with_endpoints(rel, details)?);
        }
    }
    Ok(envelope(json!({ "Relationships": collection("Relationship", rels) })))
}

async fn categories(State(state): State<AppState>, Query(q): QueryParams) -> Reply {
    state.authorize(&q)?;
    let categories = state.fixtures.categories.clone();
    Ok(envelope(json!({
        "RelationshipCategories": collection("RelationshipCategory", categories),
    })))
}

async fn between_entities(
    State(state): State<AppState>,
    Path(pair): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let (first, second) = json_id(&pair)?
        .split_once(';')
        .ok_or_else(not_found)?;
    state.entity(first)?;
    state.entity(second)?;
    let wanted = categories_filter(&q);
    let mut rels = Vec::new();
    for r in &state.fixtures.relationships {
        let ends = (field(r, "entity1_id"), field(r, "entity2_id"));
        let connects = ends == (first, second) || ends == (second, first);
        let in_category = wanted
            .as_ref()
            .map_or(true, |cats| cats.contains(field(r, "category_id")));
        if connects && in_category {
            rels.push(state.with_endpoints(r, false)?);
        }
    }
    Ok(envelope(json!({ "Relationships": collection("Relationship", rels) })))
}

// --- lists ---

async fn list(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let list = state.list(json_id(&id)?)?;
    Ok(envelope(json!({ "List": list_base(list) })))
}

async fn list_entities(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): QueryParams,
) -> Reply {
    state.authorize(&q)?;
    let list = state.list(&id)?;
    let type_names: Option<HashSet<&str>> = q.get("type_ids").map(|ids| {
        ids.split(',')
            .filter_map(|wanted| {
                state
                    .fixtures
                    .entity_types
                    .iter()
                    .find(|t| t["id"] == wanted)
                    .and_then(|t| t["name"].as_str())
            })
            .collect()
    });

    let mut entities = Vec::new();
    for entity_id in string_items(list.get("entity_ids")) {
        let entity = state.entity(entity_id)?;
        let matches_type = type_names.as_ref().map_or(true, |names| {
            string_items(entity.get("types")).any(|t| names.contains(t))
        });
        if matches_type {
            entities.push(entity_base(entity));
        }
    }
    entities.truncate(limit(&q));
    Ok(envelope(json!({
        "List": list_base(list),
        "Entities": collection("Entity", entities),
    })))
}

async fn unrecognized() -> (StatusCode, String) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        "Unrecognized request URL".to_string(),
    )
}

// --- state lookups ---

impl AppState {
    fn authorize(&self, query: &HashMap<String, String>) -> Result<(), (StatusCode, String)> {
        match query.get("_key") {
            Some(key) if key.as_str() == &*self.api_key => Ok(()),
            _ => {
                debug!("rejecting request with missing or unknown _key");
                Err((StatusCode::UNAUTHORIZED, "Bad credentials".to_string()))
            }
        }
    }

    fn entity(&self, id: &str) -> Result<&Record, (StatusCode, String)> {
        find(&self.fixtures.entities, id)
    }

    fn relationship(&self, id: &str) -> Result<&Record, (StatusCode, String)> {
        find(&self.fixtures.relationships, id)
    }

    fn list(&self, id: &str) -> Result<&Record, (StatusCode, String)> {
        find(&self.fixtures.lists, id)
    }

    /// Relationships touching `id`, narrowed by `cat_ids`, `order`,
    /// `is_current` and limited by `num`.
    fn relationships_of(&self, id: &str, query: &HashMap<String, String>) -> Vec<&Record> {
        let wanted = categories_filter(query);
        let order = query.get("order").map(String::as_str);
        let current_only = query.get("is_current").map(String::as_str) == Some("1");
        self.fixtures
            .relationships
            .iter()
            .filter(|r| field(r, "entity1_id") == id || field(r, "entity2_id") == id)
            .filter(|r| {
                wanted
                    .as_ref()
                    .map_or(true, |cats| cats.contains(field(r, "category_id")))
            })
            .filter(|r| match order {
                Some("1") => field(r, "entity1_id") == id,
                Some("2") => field(r, "entity2_id") == id,
                _ => true,
            })
            .filter(|r| !current_only || field(r, "is_current") == "1")
            .take(limit(query))
            .collect()
    }

    fn with_endpoints(&self, rel: &Record, details: bool) -> Result<Value, (StatusCode, String)> {
        let mut out = relationship_base(rel);
        if details {
            if let Some(Value::Object(extra)) = rel.get("extra") {
                out.extend(extra.clone());
            }
        }
        let entity1 = entity_base(self.entity(field(rel, "entity1_id"))?);
        let entity2 = entity_base(self.entity(field(rel, "entity2_id"))?);
        out.insert("Entity1".to_string(), entity1);
        out.insert("Entity2".to_string(), entity2);
        Ok(Value::Object(out))
    }
}

// --- payload shaping ---

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "Response": { "Data": data } }))
}

/// One element is a bare object, several are an array, none is `[]`.
fn collection(singular: &str, mut items: Vec<Value>) -> Value {
    match items.len() {
        0 => json!([]),
        1 => json!({ singular: items.remove(0) }),
        _ => json!({ singular: items }),
    }
}

fn entity_base(entity: &Record) -> Value {
    let mut out = entity.clone();
    out.remove("types");
    out.remove("aliases");
    Value::Object(out)
}

fn entity_detailed(entity: &Record) -> Value {
    let mut out = entity_base(entity);
    let types: Vec<&str> = string_items(entity.get("types")).collect();
    let aliases: Vec<Value> = string_items(entity.get("aliases"))
        .map(|a| Value::String(a.to_string()))
        .collect();
    out["types"] = Value::String(types.join(","));
    out["Aliases"] = collection("Alias", aliases);
    out
}

fn relationship_base(rel: &Record) -> Record {
    let mut out = rel.clone();
    out.remove("extra");
    out
}

fn list_base(list: &Record) -> Value {
    let mut out = list.clone();
    out.remove("entity_ids");
    Value::Object(out)
}

// --- helpers ---

fn find<'a>(records: &'a [Record], id: &str) -> Result<&'a Record, (StatusCode, String)> {
    records
        .iter()
        .find(|r| field(r, "id") == id)
        .ok_or_else(not_found)
}

fn field<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn other_end<'a>(rel: &'a Record, id: &str) -> &'a str {
    if field(rel, "entity1_id") == id {
        field(rel, "entity2_id")
    } else {
        field(rel, "entity1_id")
    }
}

fn string_items(value: Option<&Value>) -> impl Iterator<Item = &str> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn requested_ids(query: &HashMap<String, String>) -> impl Iterator<Item = &str> {
    query
        .get("ids")
        .map(String::as_str)
        .unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
}

fn categories_filter(query: &HashMap<String, String>) -> Option<HashSet<&str>> {
    query.get("cat_ids").map(|ids| ids.split(',').collect())
}

fn limit(query: &HashMap<String, String>) -> usize {
    query
        .get("num")
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

/// `/entity/1.json` routes capture `1.json`.
fn json_id(raw: &str) -> Result<&str, (StatusCode, String)> {
    raw.strip_suffix(".json").ok_or_else(not_found)
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, String::new())
}
