use std::fmt::Display;
use std::sync::Arc;

use crate::client::{Params, Session};
use crate::error::Result;
use crate::http::Transport;
use crate::models::List;
use crate::resolve;

/// List endpoints, bound to one client.
pub struct ListApi<T> {
    session: Arc<Session<T>>,
}

impl<T: Transport> ListApi<T> {
    pub(crate) fn new(session: Arc<Session<T>>) -> Self {
        Self { session }
    }

    pub fn get(&self, id: impl Display) -> Result<List> {
        let data = self.session.fetch(&format!("list/{id}.json"), &Params::new())?;
        resolve::single(data)
    }

    /// The list with `entities` populated. Accepts `type_ids`, `num` and
    /// `page`.
    pub fn get_with_entities(&self, id: impl Display, params: &Params) -> Result<List> {
        let data = self
            .session
            .fetch(&format!("list/{id}/entities.json"), params)?;
        resolve::list_with_entities(data)
    }
}
