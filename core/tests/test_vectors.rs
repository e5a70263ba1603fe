//! Verify request building, response mapping, hydration and cross-reference
//! resolution against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs and either the expected outcome or the
//! expected error. Comparing parsed JSON (not raw strings) avoids false
//! negatives from field-ordering differences.

use littlesis_core::client::{build_request, parse_response};
use littlesis_core::{
    hydrate, resolve, ApiError, ClientConfig, Entity, HttpMethod, HttpResponse, Image, List,
    Model, Params, Relationship,
};
use serde_json::{Map, Value};

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

/// Variant name of an error, as used in the `kind` of expected errors.
fn kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::Authentication(_) => "Authentication",
        ApiError::InvalidRequest { .. } => "InvalidRequest",
        ApiError::InvalidRequestData(_) => "InvalidRequestData",
        ApiError::Server(_) => "Server",
        ApiError::MalformedResponse(_) => "MalformedResponse",
        ApiError::Transport(_) => "Transport",
        ApiError::Config(_) => "Config",
    }
}

fn assert_error(name: &str, err: &ApiError, expected: &Value) {
    assert_eq!(kind(err), expected["kind"].as_str().unwrap(), "{name}: kind");
    if let Some(message) = expected["message"].as_str() {
        assert_eq!(err.to_string(), message, "{name}: message");
    }
}

fn object(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn ids<'a>(models: impl IntoIterator<Item = &'a Entity>) -> Vec<&'a str> {
    models
        .into_iter()
        .map(|e| e.id.as_deref().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    for case in cases(include_str!("../../test-vectors/requests.json")) {
        let name = case["name"].as_str().unwrap();
        let config: ClientConfig = serde_json::from_value(case["config"].clone()).unwrap();
        let mut params = Params::new();
        for (key, value) in object(&case["params"]) {
            params.insert(&key, value.as_str().unwrap());
        }

        let result = build_request(&config, case["path"].as_str().unwrap(), &params);
        if let Some(expected) = case.get("expected_error") {
            assert_error(name, &result.unwrap_err(), expected);
            continue;
        }

        let req = result.unwrap();
        let expected = &case["expected_request"];
        assert_eq!(req.method, HttpMethod::Get, "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> =
            serde_json::from_value(expected["headers"].clone()).unwrap();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    for case in cases(include_str!("../../test-vectors/responses.json")) {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            url: sim["url"].as_str().unwrap().to_string(),
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };

        match (parse_response(response), case.get("expected_error")) {
            (Err(err), Some(expected)) => assert_error(name, &err, expected),
            (Ok(data), None) => {
                assert_eq!(Value::Object(data), case["expected_data"], "{name}: data")
            }
            (Ok(data), Some(_)) => panic!("{name}: expected an error, got {data:?}"),
            (Err(err), None) => panic!("{name}: unexpected error {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

fn check_model<M: Model>(name: &str, model: &M, case: &Value) {
    for (field, expected) in object(&case["expected_fields"]) {
        assert_eq!(model.field(&field), expected.as_str(), "{name}: field {field}");
    }
    for (key, expected) in object(&case["expected_details"]) {
        assert_eq!(model.details().get(&key), Some(&expected), "{name}: details {key}");
    }

    let validation = model.validate();
    assert_eq!(
        validation.valid,
        case["expected_valid"].as_bool().unwrap(),
        "{name}: valid"
    );
    let missing: Vec<String> = serde_json::from_value(case["expected_missing"].clone()).unwrap();
    assert_eq!(validation.missing_fields, missing, "{name}: missing fields");
}

fn hydrate_case<M: Model>(name: &str, case: &Value) -> Option<M> {
    let result = hydrate::<M>(case["payload"].clone());
    if let Some(expected) = case.get("expected_error") {
        match result {
            Err(err) => assert_error(name, &err, expected),
            Ok(_) => panic!("{name}: expected an error"),
        }
        return None;
    }
    let model = result.unwrap();
    check_model(name, &model, case);
    Some(model)
}

#[test]
fn hydration_test_vectors() {
    for case in cases(include_str!("../../test-vectors/hydration.json")) {
        let name = case["name"].as_str().unwrap();
        match case["model"].as_str().unwrap() {
            "Entity" => {
                hydrate_case::<Entity>(name, &case);
            }
            "Image" => {
                hydrate_case::<Image>(name, &case);
            }
            "List" => {
                hydrate_case::<List>(name, &case);
            }
            "Relationship" => {
                let Some(rel) = hydrate_case::<Relationship>(name, &case) else {
                    continue;
                };
                let entity1 = rel.entity1.as_ref().and_then(|e| e.id.as_deref());
                let entity2 = rel.entity2.as_ref().and_then(|e| e.id.as_deref());
                assert_eq!(entity1, case["expected_entity1"].as_str(), "{name}: entity1");
                assert_eq!(entity2, case["expected_entity2"].as_str(), "{name}: entity2");
            }
            other => panic!("{name}: unknown model {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cross references
// ---------------------------------------------------------------------------

#[test]
fn resolve_test_vectors() {
    for case in cases(include_str!("../../test-vectors/resolve.json")) {
        let name = case["name"].as_str().unwrap();
        let data = object(&case["data"]);
        let expected = &case["expected"];

        match case["operation"].as_str().unwrap() {
            "entity_with_relationships" => {
                let entity = resolve::entity_with_relationships(data).unwrap();
                let rel_ids: Vec<_> = entity
                    .relationships
                    .iter()
                    .map(|r| r.id.as_deref().unwrap())
                    .collect();
                assert_eq!(entity.id.as_deref(), expected["id"].as_str(), "{name}: id");
                assert_eq!(
                    serde_json::to_value(rel_ids).unwrap(),
                    expected["relationship_ids"],
                    "{name}: relationships"
                );
            }
            "entity_with_related_entities" => {
                let entity = resolve::entity_with_related_entities(data).unwrap();
                assert_eq!(entity.id.as_deref(), expected["id"].as_str(), "{name}: id");
                assert_eq!(
                    serde_json::to_value(ids(&entity.related_entities)).unwrap(),
                    expected["related_ids"],
                    "{name}: related"
                );
                assert!(entity
                    .related_entities
                    .iter()
                    .all(|related| related.relationships.len() == 1));
            }
            "relationships_with_related_entities" => {
                let queried_id = case["queried_id"].as_str().unwrap();
                let rels = resolve::relationships_with_related_entities(data, queried_id).unwrap();
                let actual: Vec<Value> = rels
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "id": r.id,
                            "entity1": r.entity1.as_ref().and_then(|e| e.id.clone()),
                            "entity2": r.entity2.as_ref().and_then(|e| e.id.clone()),
                        })
                    })
                    .collect();
                assert_eq!(Value::Array(actual), *expected, "{name}: slots");
            }
            "list_with_entities" => {
                let list = resolve::list_with_entities(data).unwrap();
                assert_eq!(list.id.as_deref(), expected["id"].as_str(), "{name}: id");
                assert_eq!(
                    serde_json::to_value(ids(&list.entities)).unwrap(),
                    expected["entity_ids"],
                    "{name}: entities"
                );
            }
            other => panic!("{name}: unknown operation {other}"),
        }
    }
}
