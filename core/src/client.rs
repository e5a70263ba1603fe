//! The configured client and its per-model namespaces.
//!
//! # Design
//! `LittlesisClient` owns one `Session` (config plus host transport) behind
//! an `Arc`. Namespace objects (`entity()`, `relationship()`, ...) are
//! created on first access, memoized for the client's lifetime, and each
//! holds a clone of that client's session only. Nothing is shared between
//! two clients and nothing is mutated after construction.
//!
//! Every round trip is split into `build_request` (produces an
//! `HttpRequest`) and `parse_response` (consumes an `HttpResponse` and
//! returns `Response.Data`), so hosts that cannot implement `Transport` can
//! still execute requests themselves and feed the result to the functions
//! in [`crate::resolve`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoints::{EntityApi, ImageApi, ListApi, RelationshipApi};
use crate::error::{ApiError, Result};
use crate::http::{redact_key, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::payload::response_data;

/// Query parameter carrying the API key on every request.
pub const API_KEY_PARAM: &str = "_key";

/// Pass-through query parameters (`num`, `cat_ids`, `order`, ...).
///
/// Their semantics belong to the service; the client only encodes them, in
/// name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl ToString) {
        self.0.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// Configuration plus transport, shared by one client's namespaces.
pub(crate) struct Session<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> Session<T> {
    /// One authenticated GET, returning `Response.Data`.
    pub(crate) fn fetch(&self, path: &str, params: &Params) -> Result<Map<String, Value>> {
        let request = build_request(&self.config, path, params)?;
        debug!("GET {}", request.redacted_url());
        let response = self.transport.execute(&request)?;
        debug!("{} from {}", response.status, redact_key(&response.url));
        parse_response(response)
    }
}

/// Client for the LittleSis API bound to one configuration and transport.
pub struct LittlesisClient<T> {
    session: Arc<Session<T>>,
    entity: OnceLock<EntityApi<T>>,
    relationship: OnceLock<RelationshipApi<T>>,
    list: OnceLock<ListApi<T>>,
    image: OnceLock<ImageApi<T>>,
}

impl<T> std::fmt::Debug for LittlesisClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LittlesisClient")
            .field("config", &self.session.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> LittlesisClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            session: Arc::new(Session { config, transport }),
            entity: OnceLock::new(),
            relationship: OnceLock::new(),
            list: OnceLock::new(),
            image: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.session.config
    }

    pub fn entity(&self) -> &EntityApi<T> {
        self.entity
            .get_or_init(|| EntityApi::new(Arc::clone(&self.session)))
    }

    pub fn relationship(&self) -> &RelationshipApi<T> {
        self.relationship
            .get_or_init(|| RelationshipApi::new(Arc::clone(&self.session)))
    }

    pub fn list(&self) -> &ListApi<T> {
        self.list
            .get_or_init(|| ListApi::new(Arc::clone(&self.session)))
    }

    pub fn image(&self) -> &ImageApi<T> {
        self.image
            .get_or_init(|| ImageApi::new(Arc::clone(&self.session)))
    }

    pub fn build_request(&self, path: &str, params: &Params) -> Result<HttpRequest> {
        build_request(&self.session.config, path, params)
    }

    pub fn parse_response(&self, response: HttpResponse) -> Result<Map<String, Value>> {
        parse_response(response)
    }

    /// Raw `Response.Data` for any path, for endpoints without a typed method.
    pub fn fetch(&self, path: &str, params: &Params) -> Result<Map<String, Value>> {
        self.session.fetch(path, params)
    }
}

/// Resolve `path` against the configured host and append `params` and the
/// API key. Fails with `Authentication` before anything is sent when no key
/// is configured.
pub fn build_request(config: &ClientConfig, path: &str, params: &Params) -> Result<HttpRequest> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ApiError::Authentication("You must use an api key".to_string()))?;

    let mut url = config
        .base_url()?
        .join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::Config(format!("invalid request path '{path}': {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params.iter().filter(|(key, _)| *key != API_KEY_PARAM) {
            query.append_pair(key, value);
        }
        query.append_pair(API_KEY_PARAM, api_key);
    }

    Ok(HttpRequest {
        method: HttpMethod::Get,
        url: url.to_string(),
        headers: vec![("accept".to_string(), "application/json".to_string())],
    })
}

/// Map the status code, then parse the body and navigate to `Response.Data`.
pub fn parse_response(response: HttpResponse) -> Result<Map<String, Value>> {
    check_status(&response)?;
    let body: Value = serde_json::from_str(&response.body).map_err(|e| {
        ApiError::malformed(format!("status {} body is not JSON: {e}", response.status))
    })?;
    response_data(body)
}

/// Map error status codes to the appropriate `ApiError` variant. Any other
/// status is left for payload parsing.
fn check_status(response: &HttpResponse) -> Result<()> {
    match response.status {
        400 => Err(ApiError::InvalidRequestData(response.body.clone())),
        401 => Err(ApiError::Authentication("Bad credentials".to_string())),
        404 => Err(ApiError::InvalidRequest {
            url: redact_key(&response.url),
            reason: "Resource doesn't exist".to_string(),
        }),
        405 => Err(ApiError::InvalidRequest {
            url: redact_key(&response.url),
            reason: "Unrecognized request URL".to_string(),
        }),
        500 => Err(ApiError::Server(response.body.clone())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records requests and replays one canned response.
    struct Canned {
        status: u16,
        body: &'static str,
        calls: Cell<usize>,
        last_url: RefCell<Option<String>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                calls: Cell::new(0),
                last_url: RefCell::new(None),
            }
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.calls.set(self.calls.get() + 1);
            *self.last_url.borrow_mut() = Some(request.url.clone());
            Ok(HttpResponse {
                status: self.status,
                url: request.url.clone(),
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("api.littlesis.org", Some("secret"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            url: "http://api.littlesis.org/entity/x.json?_key=secret".to_string(),
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_request_appends_params_and_key_last() {
        let params = Params::from([("order", "1"), ("cat_ids", "1,2")]);
        let req = build_request(&config(), "entity/1/relationships.json", &params).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://api.littlesis.org/entity/1/relationships.json?cat_ids=1%2C2&order=1&_key=secret"
        );
    }

    #[test]
    fn caller_cannot_override_api_key() {
        let params = Params::new().with("_key", "other");
        let req = build_request(&config(), "/entity/1.json", &params).unwrap();
        assert_eq!(req.url, "http://api.littlesis.org/entity/1.json?_key=secret");
    }

    #[test]
    fn missing_key_fails_before_transport_is_called() {
        let transport = Canned::new(200, "{}");
        let client = LittlesisClient::new(ClientConfig::new("api.littlesis.org", None), &transport);
        let err = client.entity().get(1).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
        assert_eq!(transport.calls.get(), 0);
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let err = build_request(
            &ClientConfig::new("api.littlesis.org", Some("")),
            "entity/1.json",
            &Params::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn status_400_is_invalid_request_data_with_body() {
        let err = parse_response(response(400, "bad num")).unwrap_err();
        assert!(matches!(&err, ApiError::InvalidRequestData(body) if body == "bad num"));
        assert!(err.is_invalid_request());
    }

    #[test]
    fn status_401_is_authentication() {
        let err = parse_response(response(401, "")).unwrap_err();
        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn status_404_and_405_carry_redacted_url() {
        for status in [404, 405] {
            let err = parse_response(response(status, "")).unwrap_err();
            match err {
                ApiError::InvalidRequest { url, .. } => {
                    assert!(url.starts_with("http://api.littlesis.org/entity/x.json"));
                    assert!(!url.contains("secret"));
                }
                other => panic!("expected InvalidRequest, got {other:?}"),
            }
        }
    }

    #[test]
    fn status_500_is_server_error_with_body() {
        let err = parse_response(response(500, "boom")).unwrap_err();
        assert!(matches!(err, ApiError::Server(body) if body == "boom"));
    }

    #[test]
    fn unlisted_status_is_parsed_as_payload() {
        let data = parse_response(response(203, r#"{"Response":{"Data":{"x":1}}}"#)).unwrap();
        assert_eq!(data["x"], 1);
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_response(response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn namespaces_are_memoized_per_client() {
        let transport = Canned::new(200, "{}");
        let client = LittlesisClient::new(config(), &transport);
        assert!(std::ptr::eq(client.entity(), client.entity()));
        assert!(std::ptr::eq(client.list(), client.list()));

        let other = LittlesisClient::new(config(), &transport);
        assert!(!std::ptr::eq(client.entity(), other.entity()));
    }

    #[test]
    fn fetch_sends_through_transport() {
        let transport = Canned::new(200, r#"{"Response":{"Data":{"ok":"1"}}}"#);
        let client = LittlesisClient::new(config(), &transport);
        let data = client.fetch("relationships/categories.json", &Params::new()).unwrap();
        assert_eq!(data["ok"], "1");
        assert_eq!(transport.calls.get(), 1);
        assert_eq!(
            transport.last_url.borrow().as_deref(),
            Some("http://api.littlesis.org/relationships/categories.json?_key=secret")
        );
    }
}
