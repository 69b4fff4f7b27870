//! Dependent selection of document sub-types.

use crate::error::Result;
use crate::session::{Applied, ChildTicket};
use crate::store::ListStore;
use crate::vocab::{sub_type_options, ChoiceOption};
use crate::SharedSession;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Resolves the selectable sub-types whenever the document type changes.
///
/// Every change re-fetches the full child vocabulary; nothing is cached
/// across parents.
#[derive(Clone)]
pub struct DependentSelector {
    store: Arc<dyn ListStore>,
}

impl DependentSelector {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    /// Children of `parent_key`, filtered locally on the parent reference.
    pub async fn fetch_children(&self, parent_id: u64, parent_key: &str) -> Result<Vec<ChoiceOption>> {
        let rows = self.store.fetch_document_sub_types(parent_id).await?;
        let options = sub_type_options(&rows, parent_key);
        debug!(parent = parent_key, total = rows.len(), kept = options.len(), "Filtered document sub-types");
        Ok(options)
    }

    /// Fetch and apply the children for a ticket. On failure the session's
    /// options stay as they were.
    pub async fn resolve(&self, session: &SharedSession, ticket: ChildTicket) -> Option<Applied> {
        let guard = session.lock().await.guard();

        let options = match self.fetch_children(ticket.parent_id(), &ticket.parent_key()).await {
            Ok(options) => options,
            Err(e) => {
                error!(parent = ticket.parent_id(), "Error fetching document sub-types: {}", e);
                return None;
            }
        };

        if !guard.is_live() {
            debug!("Session closed; dropping document sub-types");
            return Some(Applied::Discarded);
        }

        let applied = session.lock().await.apply_children(ticket, options);
        if applied == Applied::Applied {
            info!(parent = ticket.parent_id(), "Document sub-types updated");
        }
        Some(applied)
    }

    /// The document type changed: clear the selected sub-types, then
    /// re-resolve the selectable ones for the new parent.
    ///
    /// The session lock is released while the fetch is in flight, so other
    /// edits proceed meanwhile.
    pub async fn on_parent_changed(&self, session: &SharedSession, parent_key: &str) -> Result<Option<Applied>> {
        let ticket = session.lock().await.begin_parent_change(parent_key)?;
        Ok(self.resolve(session, ticket).await)
    }
}
