//! Per-session form state.
//!
//! A [`FormSession`] owns the record being edited and the option
//! vocabularies. Network calls never hold it: callers take what they need,
//! release it, await, then hand results back through the `apply_*` methods,
//! which discard anything arriving after the session closed or after a newer
//! request superseded it.

use crate::error::{FormError, Result};
use crate::host::DisplayMode;
use crate::layout::Tab;
use crate::record::{Category, Completion, Priority, Record, Status, Tag};
use crate::vocab::{ChoiceOption, DocumentType, User};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
    Submitting,
    ClosedSaved,
    ClosedCancelled,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::ClosedSaved | SessionState::ClosedCancelled)
    }
}

/// Liveness flag shared with in-flight work.
///
/// Cloned into every asynchronous operation; revoked when the session closes.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    live: Arc<AtomicBool>,
}

impl SessionGuard {
    fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn revoke(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Outcome of handing an asynchronous result back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// State updated
    Applied,
    /// A newer request owns this slot; result dropped
    Superseded,
    /// Session closed; result dropped
    Discarded,
}

/// Token for one child-vocabulary fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildTicket {
    generation: u64,
    parent_id: u64,
    /// Drop selected children missing from the fetched options
    prune_selection: bool,
}

impl ChildTicket {
    pub fn parent_id(&self) -> u64 {
        self.parent_id
    }

    /// Parent id as the option key the filter compares against
    pub fn parent_key(&self) -> String {
        self.parent_id.to_string()
    }
}

/// Snapshot taken when a submit starts
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub record: Record,
    pub mode: DisplayMode,
    pub record_id: Option<u64>,
}

/// State of one open form
#[derive(Debug)]
pub struct FormSession {
    mode: DisplayMode,
    record_id: Option<u64>,
    state: SessionState,
    record: Record,
    users: Vec<User>,
    document_types: Vec<DocumentType>,
    sub_type_options: Vec<ChoiceOption>,
    /// Classification the current `sub_type_options` were fetched for
    sub_type_parent: Option<u64>,
    active_tab: Tab,
    child_generation: u64,
    guard: SessionGuard,
}

impl FormSession {
    pub fn new(mode: DisplayMode, record_id: Option<u64>) -> Self {
        Self {
            mode,
            record_id,
            state: SessionState::Uninitialized,
            record: Record::default(),
            users: Vec::new(),
            document_types: Vec::new(),
            sub_type_options: Vec::new(),
            sub_type_parent: None,
            active_tab: Tab::default(),
            child_generation: 0,
            guard: SessionGuard::new(),
        }
    }

    // === Accessors ===

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn record_id(&self) -> Option<u64> {
        self.record_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn guard(&self) -> SessionGuard {
        self.guard.clone()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn document_types(&self) -> &[DocumentType] {
        &self.document_types
    }

    pub fn assignee_options(&self) -> Vec<ChoiceOption> {
        self.users.iter().map(User::option).collect()
    }

    pub fn document_type_options(&self) -> Vec<ChoiceOption> {
        self.document_types.iter().map(DocumentType::option).collect()
    }

    /// Selectable children of the current classification
    pub fn sub_type_options(&self) -> &[ChoiceOption] {
        &self.sub_type_options
    }

    /// Display name of the assignee, once the user vocabulary is in
    pub fn assignee_name(&self) -> Option<&str> {
        let id = self.record.assignee?;
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.display_name.as_str())
    }

    // === Loading ===

    /// Uninitialized -> Loading
    pub fn begin_loading(&mut self) -> Result<SessionGuard> {
        self.expect_state(SessionState::Uninitialized, "load")?;
        self.state = SessionState::Loading;
        Ok(self.guard())
    }

    pub fn apply_vocabularies(&mut self, users: Vec<User>, document_types: Vec<DocumentType>) -> Applied {
        if self.is_closed() {
            return Applied::Discarded;
        }
        self.users = users;
        self.document_types = document_types;
        Applied::Applied
    }

    pub fn apply_record(&mut self, record: Record) -> Applied {
        if self.is_closed() {
            return Applied::Discarded;
        }
        self.record = record;
        // Options fetched for a previous classification no longer apply.
        self.sub_type_options.clear();
        self.sub_type_parent = None;
        Applied::Applied
    }

    /// Loading -> Ready
    pub fn finish_loading(&mut self) -> Applied {
        if self.is_closed() {
            return Applied::Discarded;
        }
        self.state = SessionState::Ready;
        Applied::Applied
    }

    // === Field edits ===

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.editable("set title")?;
        self.record.title = title.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<()> {
        self.editable("set description")?;
        self.record.description = description.into();
        Ok(())
    }

    pub fn set_status(&mut self, status: Status) -> Result<()> {
        self.editable("set status")?;
        self.record.status = status;
        Ok(())
    }

    pub fn set_priority(&mut self, priority: Priority) -> Result<()> {
        self.editable("set priority")?;
        self.record.priority = priority;
        Ok(())
    }

    pub fn set_due_date(&mut self, due_date: Option<NaiveDate>) -> Result<()> {
        self.editable("set due date")?;
        self.record.due_date = due_date;
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<Category>) -> Result<()> {
        self.editable("set category")?;
        self.record.category = category;
        Ok(())
    }

    /// Completion from raw input; non-numeric text becomes 0, range is clamped.
    pub fn set_completion_text(&mut self, text: &str) -> Result<Completion> {
        self.editable("set completion")?;
        self.record.completion = Completion::parse_lossy(text);
        Ok(self.record.completion)
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) -> Result<()> {
        self.editable("set comments")?;
        self.record.comments = comments.into();
        Ok(())
    }

    /// Assign by option key, or clear with `None`.
    pub fn set_assignee_key(&mut self, key: Option<&str>) -> Result<()> {
        self.editable("set assignee")?;
        self.record.assignee = match key.map(str::trim) {
            None | Some("") => None,
            Some(key) => Some(parse_key("assignee", key)?),
        };
        Ok(())
    }

    pub fn toggle_tag(&mut self, tag: Tag) -> Result<bool> {
        self.editable("toggle tag")?;
        Ok(self.record.toggle_tag(tag))
    }

    /// Toggle a child classification. Only keys among the options fetched for
    /// the current classification are accepted.
    pub fn toggle_sub_classification(&mut self, key: &str) -> Result<bool> {
        self.editable("toggle sub-classification")?;

        let fresh = self.sub_type_parent.is_some() && self.sub_type_parent == self.record.classification;
        if !fresh || !self.sub_type_options.iter().any(|o| o.key == key) {
            return Err(FormError::InvalidKey {
                field: "document sub-type",
                key: key.to_string(),
            });
        }

        let id = parse_key("document sub-type", key)?;
        let selected = &mut self.record.sub_classifications;
        if selected.remove(&id) {
            Ok(false)
        } else {
            selected.insert(id);
            Ok(true)
        }
    }

    pub fn select_tab(&mut self, tab: Tab) -> Result<()> {
        if self.is_closed() {
            return Err(FormError::InvalidState {
                action: "select tab",
                state: self.state,
            });
        }
        self.active_tab = tab;
        Ok(())
    }

    // === Dependent children ===

    /// Set the classification and clear its children. The returned ticket
    /// must accompany the fetched options.
    pub fn begin_parent_change(&mut self, key: &str) -> Result<ChildTicket> {
        self.editable("change document type")?;
        let parent_id = parse_key("document type", key)?;

        self.record.classification = Some(parent_id);
        self.record.sub_classifications.clear();

        self.child_generation += 1;
        Ok(ChildTicket {
            generation: self.child_generation,
            parent_id,
            prune_selection: false,
        })
    }

    /// Unset the classification. Its children, their options and any fetch
    /// still in flight are dropped with it.
    pub fn clear_classification(&mut self) -> Result<()> {
        self.editable("clear document type")?;
        self.record.classification = None;
        self.record.sub_classifications.clear();
        self.sub_type_options.clear();
        self.sub_type_parent = None;
        self.child_generation += 1;
        Ok(())
    }

    /// Ticket for fetching the children of a hydrated classification,
    /// keeping the stored selection.
    pub fn begin_children_prefetch(&mut self) -> Option<ChildTicket> {
        if self.is_closed() {
            return None;
        }
        let parent_id = self.record.classification?;

        self.child_generation += 1;
        Some(ChildTicket {
            generation: self.child_generation,
            parent_id,
            prune_selection: true,
        })
    }

    pub fn apply_children(&mut self, ticket: ChildTicket, options: Vec<ChoiceOption>) -> Applied {
        if self.is_closed() {
            return Applied::Discarded;
        }
        if ticket.generation != self.child_generation {
            return Applied::Superseded;
        }

        if ticket.prune_selection {
            let before = self.record.sub_classifications.len();
            self.record
                .sub_classifications
                .retain(|id| options.iter().any(|o| o.key == id.to_string()));
            let dropped = before - self.record.sub_classifications.len();
            if dropped > 0 {
                tracing::warn!(
                    parent = ticket.parent_id,
                    dropped,
                    "Dropped stored sub-types that do not belong to the document type"
                );
            }
        }

        self.sub_type_options = options;
        self.sub_type_parent = Some(ticket.parent_id);
        Applied::Applied
    }

    // === Submit / close ===

    /// Ready -> Submitting
    pub fn begin_submit(&mut self) -> Result<SubmitRequest> {
        self.expect_state(SessionState::Ready, "submit")?;
        self.state = SessionState::Submitting;
        Ok(SubmitRequest {
            record: self.record.clone(),
            mode: self.mode,
            record_id: self.record_id,
        })
    }

    /// Submitting -> ClosedSaved when `saved`, otherwise back to Ready.
    pub fn finish_submit(&mut self, saved: bool) -> Applied {
        if self.state != SessionState::Submitting {
            return Applied::Discarded;
        }
        if saved {
            self.close(true);
        } else {
            self.state = SessionState::Ready;
        }
        Applied::Applied
    }

    /// Close the session. Returns `false` if it was already closed.
    pub fn close(&mut self, was_saved: bool) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = if was_saved {
            SessionState::ClosedSaved
        } else {
            SessionState::ClosedCancelled
        };
        self.guard.revoke();
        true
    }

    // === Helpers ===

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(FormError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn editable(&self, action: &'static str) -> Result<()> {
        self.expect_state(SessionState::Ready, action)?;
        if !self.mode.is_writable() {
            return Err(FormError::ReadOnly(self.mode));
        }
        Ok(())
    }
}

fn parse_key(field: &'static str, key: &str) -> Result<u64> {
    key.trim().parse().map_err(|_| FormError::InvalidKey {
        field,
        key: key.to_string(),
    })
}
