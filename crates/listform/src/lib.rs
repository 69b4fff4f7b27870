//! Listform - form engine for one list-backed record type
//!
//! Drives a single data-entry form over a hosted list store:
//! - hydrates the record and its lookup vocabularies on entry
//! - narrows document sub-types to the chosen document type
//! - writes the record back through the store's create/update call
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            FormController               │
//! │   (one open form; talks to the host)    │
//! └───────┬──────────────┬──────────────────┘
//!         │              │
//!         ▼              ▼
//! ┌──────────────┐ ┌──────────────────┐
//! │ Synchronizer │ │ DependentSelector│
//! └──────┬───────┘ └────────┬─────────┘
//!        └────────┬─────────┘
//!                 ▼
//!        ┌─────────────────┐      ┌─────────────┐
//!        │   ListStore     │ ───▶ │ FormSession │
//!        │ (HTTP / Mock)   │      │  (state)    │
//!        └─────────────────┘      └─────────────┘
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod host;
pub mod layout;
pub mod record;
pub mod selector;
pub mod session;
pub mod store;
pub mod sync;
pub mod vocab;
pub mod wire;

use std::sync::Arc;

/// Session handle shared between the controller and in-flight work
pub type SharedSession = Arc<tokio::sync::Mutex<session::FormSession>>;

// Re-export main types for convenience
pub use config::FormConfig;
pub use error::{FormError, Result};
pub use form::FormController;
pub use host::{DisplayMode, FormHost, HostEvent, RecordingHost};
pub use layout::{Field, FormLayout, Tab};
pub use record::{Category, Completion, Priority, Record, Status, Tag};
pub use selector::DependentSelector;
pub use session::{Applied, FormSession, SessionGuard, SessionState};
pub use store::{HttpListStore, ListStore, MockStore};
pub use sync::{SubmitOutcome, Synchronizer};
pub use vocab::{ChoiceOption, DocumentSubType, DocumentType, User};
