//! Client core for the LittleSis relationship-graph API.
//!
//! # Overview
//! Builds authenticated `HttpRequest` values, maps `HttpResponse` status
//! codes to typed errors, and hydrates the service's loosely-structured
//! payloads into `Entity`, `Relationship`, `List` and `Image` models,
//! including the cross references between them. The host performs the
//! actual I/O, either by implementing `Transport` or by executing requests
//! itself between `build_request` and `parse_response`.
//!
//! # Design
//! - Hydration is one generic routine driven by each model's declared field
//!   allow-list and a small table of structural strategies; unknown keys go
//!   to the model's `details` bag instead of failing.
//! - Cross references that arrive as siblings in `Response.Data` are stitched
//!   together by the functions in `resolve`.
//! - The client holds no mutable state beyond lazily created, per-client
//!   endpoint namespaces.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod hydrate;
pub mod models;
pub mod payload;
pub mod resolve;
pub mod validate;

pub use client::{LittlesisClient, Params};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use hydrate::{hydrate, Details, Model};
pub use models::{Entity, Image, List, Relationship};
pub use validate::Validation;
