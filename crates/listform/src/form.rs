//! One open form: wires the session to the store and the host.

use crate::config::FormConfig;
use crate::error::Result;
use crate::host::{DisplayMode, FormHost};
use crate::selector::DependentSelector;
use crate::session::{Applied, FormSession, SessionState};
use crate::store::ListStore;
use crate::sync::{SubmitOutcome, Synchronizer};
use crate::SharedSession;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// A form session bound to its store and host.
///
/// ```rust,ignore
/// let form = FormController::new(store, host, &FormConfig::default(), DisplayMode::Edit, Some(7));
/// form.open().await?;
/// form.session().await.set_title("Quarterly audit")?;
/// form.change_classification("1").await?;
/// form.submit().await?;
/// ```
pub struct FormController {
    session: SharedSession,
    sync: Synchronizer,
    selector: DependentSelector,
    host: Arc<dyn FormHost>,
}

impl FormController {
    pub fn new(
        store: Arc<dyn ListStore>,
        host: Arc<dyn FormHost>,
        config: &FormConfig,
        mode: DisplayMode,
        record_id: Option<u64>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(FormSession::new(mode, record_id))),
            sync: Synchronizer::new(store.clone(), config.entity_type())
                .with_site_offset(config.site_offset()),
            selector: DependentSelector::new(store),
            host,
        }
    }

    /// Lock the session for reads or field edits.
    pub async fn session(&self) -> MutexGuard<'_, FormSession> {
        self.session.lock().await
    }

    /// Shared handle, for callers driving edits from other tasks
    pub fn shared_session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn synchronizer(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn selector(&self) -> &DependentSelector {
        &self.selector
    }

    /// Hydrate the session: both vocabularies first, then the record, then the
    /// children of a stored classification. Read failures only degrade data.
    pub async fn open(&self) -> Result<SessionState> {
        let (mode, record_id, guard) = {
            let mut session = self.session.lock().await;
            let guard = session.begin_loading()?;
            (session.mode(), session.record_id(), guard)
        };
        info!(%mode, ?record_id, "Opening form");

        let (users, document_types) =
            futures::join!(self.sync.load_users(), self.sync.load_document_types());
        if self.session.lock().await.apply_vocabularies(users, document_types) == Applied::Discarded {
            return Ok(self.state().await);
        }

        if guard.is_live() && mode.reads_record() && record_id.is_some() {
            let record = self.sync.load(mode, record_id).await;
            self.session.lock().await.apply_record(record);
        }

        let prefetch = self.session.lock().await.begin_children_prefetch();
        if let Some(ticket) = prefetch {
            self.selector.resolve(&self.session, ticket).await;
        }

        self.session.lock().await.finish_loading();
        Ok(self.state().await)
    }

    /// The document type changed in the UI.
    pub async fn change_classification(&self, key: &str) -> Result<Option<Applied>> {
        self.selector.on_parent_changed(&self.session, key).await
    }

    /// Write the record. Success closes the form; failures alert the user and
    /// leave it open.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let request = self.session.lock().await.begin_submit()?;

        let outcome = self
            .sync
            .submit(&request.record, request.mode, request.record_id)
            .await;

        let applied = self.session.lock().await.finish_submit(outcome.is_saved());
        if applied == Applied::Discarded {
            warn!(?outcome, "Form closed while saving; outcome not reported");
            return Ok(outcome);
        }

        if outcome.is_saved() {
            self.host.notify(&outcome.user_message());
            self.host.form_saved();
            self.host.form_closed(true);
        } else {
            self.host.alert(&outcome.user_message());
        }
        Ok(outcome)
    }

    /// Close without saving. No-op once closed.
    pub async fn cancel(&self) {
        if self.session.lock().await.close(false) {
            info!("Form cancelled");
            self.host.form_closed(false);
        }
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }
}
