use serde::Serialize;

use crate::hydrate::{Details, Model};
use crate::model_fields;

/// An image attached to an entity. Images are only listed, never fetched
/// by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Image {
    pub id: Option<String>,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub is_featured: Option<String>,
    pub uri: Option<String>,
    pub source: Option<String>,
    pub address_id: Option<String>,
    pub details: Details,
}

impl Model for Image {
    const NAME: &'static str = "Image";
    const PLURAL: &'static str = "Images";
    const REQUIRED: &'static [&'static str] = &["id", "title", "is_featured", "uri", "source"];

    model_fields!(id, title, caption, is_featured, uri, source, address_id);
}
