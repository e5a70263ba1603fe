use std::fmt::Display;
use std::sync::Arc;

use crate::client::{Params, Session};
use crate::error::Result;
use crate::http::Transport;
use crate::models::Image;
use crate::resolve;

/// Image endpoints, bound to one client. Images have no fetch-by-id.
pub struct ImageApi<T> {
    session: Arc<Session<T>>,
}

impl<T: Transport> ImageApi<T> {
    pub(crate) fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }

    pub fn for_entity(&self, entity_id: impl Display) -> Result<Vec<Image>> {
        let data = self
            .session
            .fetch(&format!("entity/{entity_id}/images.json"), &Params::new())?;
        resolve::many(data)
    }
}
