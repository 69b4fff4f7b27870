//! Record synchronization: hydrate on entry, write back on submit.

use crate::host::DisplayMode;
use crate::record::Record;
use crate::store::ListStore;
use crate::vocab::{eligible_assignees, DocumentType, User};
use crate::wire::RecordPayload;
use chrono::{FixedOffset, Offset, Utc};
use listform_client::ClientError;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// New item written
    Created,
    /// Existing item overwritten
    Updated,
    /// Store refused the write; message is the store's or the raw body
    Rejected { message: String },
    /// Transport or decoding failure
    Failed { message: String },
    /// Not sent: required field blank or form read-only
    Invalid { message: String },
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Created | SubmitOutcome::Updated)
    }

    /// Text for the user
    pub fn user_message(&self) -> String {
        match self {
            SubmitOutcome::Created => "Item created successfully!".to_string(),
            SubmitOutcome::Updated => "Item updated successfully!".to_string(),
            SubmitOutcome::Rejected { message } => format!("Error saving item: {}", message),
            SubmitOutcome::Failed { message } => format!("An unexpected error occurred: {}", message),
            SubmitOutcome::Invalid { message } => message.clone(),
        }
    }
}

/// Where a submit goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Create,
    Update(u64),
}

impl WriteTarget {
    /// Update only when editing an existing item; everything else creates.
    pub fn for_mode(mode: DisplayMode, record_id: Option<u64>) -> Self {
        match (mode, record_id) {
            (DisplayMode::Edit, Some(id)) => WriteTarget::Update(id),
            _ => WriteTarget::Create,
        }
    }
}

/// Loads and stores the record and its reference vocabularies.
#[derive(Clone)]
pub struct Synchronizer {
    store: Arc<dyn ListStore>,
    entity_type: String,
    site_offset: FixedOffset,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn ListStore>, entity_type: impl Into<String>) -> Self {
        Self {
            store,
            entity_type: entity_type.into(),
            site_offset: Utc.fix(),
        }
    }

    /// Time zone the site stores date-only columns in (UTC unless set)
    pub fn with_site_offset(mut self, site_offset: FixedOffset) -> Self {
        self.site_offset = site_offset;
        self
    }

    /// Stored record for edit/view, defaults otherwise or on any failure.
    pub async fn load(&self, mode: DisplayMode, record_id: Option<u64>) -> Record {
        let id = match (mode.reads_record(), record_id) {
            (true, Some(id)) => id,
            _ => return Record::default(),
        };

        match self.store.fetch_record(id).await {
            Ok(item) => {
                info!(id, "Loaded record");
                item.into_record(self.site_offset)
            }
            Err(e) => {
                error!(id, "Error fetching record: {}", e);
                Record::default()
            }
        }
    }

    /// Individual users from the site directory. Empty on failure.
    pub async fn load_users(&self) -> Vec<User> {
        match self.store.fetch_site_users().await {
            Ok(principals) => {
                let users = eligible_assignees(principals);
                info!(count = users.len(), "Fetched users");
                users
            }
            Err(e) => {
                error!("Error fetching users: {}", e);
                Vec::new()
            }
        }
    }

    /// The classification vocabulary. Empty on failure.
    pub async fn load_document_types(&self) -> Vec<DocumentType> {
        match self.store.fetch_document_types().await {
            Ok(types) => {
                info!(count = types.len(), "Fetched document types");
                types
            }
            Err(e) => {
                error!("Error fetching document types: {}", e);
                Vec::new()
            }
        }
    }

    /// Write the record: create in new mode, update when editing an item.
    pub async fn submit(&self, record: &Record, mode: DisplayMode, record_id: Option<u64>) -> SubmitOutcome {
        if !mode.is_writable() {
            return SubmitOutcome::Invalid {
                message: format!("The form is read-only in {} mode.", mode),
            };
        }

        let missing = record.missing_required();
        if !missing.is_empty() {
            let labels: Vec<_> = missing.iter().map(|f| f.label()).collect();
            return SubmitOutcome::Invalid {
                message: format!("Required: {}", labels.join(", ")),
            };
        }

        let payload = RecordPayload::from_record(record, &self.entity_type, self.site_offset);
        let target = WriteTarget::for_mode(mode, record_id);

        let result = match target {
            WriteTarget::Create => self.store.create_record(&payload).await,
            WriteTarget::Update(id) => self.store.update_record(id, &payload).await,
        };

        match (result, target) {
            (Ok(()), WriteTarget::Create) => {
                info!("Created record");
                SubmitOutcome::Created
            }
            (Ok(()), WriteTarget::Update(id)) => {
                info!(id, "Updated record");
                SubmitOutcome::Updated
            }
            (Err(ClientError::Rejected { status, message }), _) => {
                warn!(status, "Store rejected record: {}", message);
                SubmitOutcome::Rejected { message }
            }
            (Err(e), _) => {
                error!("Unexpected error saving record: {}", e);
                SubmitOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Completion, Tag};
    use crate::store::mock::{MockFailure, MockOp};
    use crate::store::{MockStore, StoreCall};
    use chrono::NaiveDate;
    use listform_client::SiteUser;
    use serde_json::json;

    fn sync_with(store: &Arc<MockStore>) -> Synchronizer {
        Synchronizer::new(store.clone(), "SP.Data.VDMDemoListItem")
    }

    fn titled(title: &str) -> Record {
        Record {
            title: title.into(),
            ..Record::default()
        }
    }

    #[tokio::test]
    async fn test_load_create_mode_never_reads() {
        let store = Arc::new(MockStore::new().with_item(1, json!({"Id": 1, "Title": "Stored"})));
        let sync = sync_with(&store);

        let record = sync.load(DisplayMode::New, Some(1)).await;
        assert_eq!(record, Record::default());

        let record = sync.load(DisplayMode::Edit, None).await;
        assert_eq!(record, Record::default());

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_edit_hydrates() {
        let store = Arc::new(MockStore::new().with_item(
            1,
            json!({"Id": 1, "Title": "Stored", "Priority": null, "CompletionPercentage": 20}),
        ));

        let record = sync_with(&store).load(DisplayMode::Edit, Some(1)).await;
        assert_eq!(record.title, "Stored");
        assert_eq!(record.completion.get(), 20);
        assert_eq!(store.calls(), vec![StoreCall::FetchRecord(1)]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_defaults() {
        let store = Arc::new(MockStore::new());
        store.fail(MockOp::Record, MockFailure::Transport);

        let record = sync_with(&store).load(DisplayMode::Edit, Some(1)).await;
        assert_eq!(record, Record::default());
    }

    #[tokio::test]
    async fn test_load_users_excludes_groups() {
        let store = Arc::new(MockStore::new().with_users(vec![
            SiteUser { id: 1, title: "Ada".into(), principal_type: 1 },
            SiteUser { id: 7, title: "Site Owners".into(), principal_type: 4 },
        ]));

        let users = sync_with(&store).load_users().await;
        assert_eq!(users, vec![User { id: 1, display_name: "Ada".into() }]);
    }

    #[tokio::test]
    async fn test_vocabulary_failures_degrade_to_empty() {
        let store = Arc::new(MockStore::new().with_users(vec![SiteUser {
            id: 1,
            title: "Ada".into(),
            principal_type: 1,
        }]));
        store.fail(MockOp::Users, MockFailure::Transport);
        store.fail(
            MockOp::DocumentTypes,
            MockFailure::Rejected { status: 500, body: "boom".into() },
        );

        let sync = sync_with(&store);
        assert!(sync.load_users().await.is_empty());
        assert!(sync.load_document_types().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_targets() {
        let store = Arc::new(MockStore::new().with_item(4, json!({"Id": 4, "Title": "Old"})));
        let sync = sync_with(&store);

        assert_eq!(sync.submit(&titled("New"), DisplayMode::New, None).await, SubmitOutcome::Created);
        assert_eq!(
            sync.submit(&titled("Edited"), DisplayMode::Edit, Some(4)).await,
            SubmitOutcome::Updated
        );
        assert_eq!(store.calls(), vec![StoreCall::Create, StoreCall::Update(4)]);
        assert_eq!(store.item(4).unwrap()["Title"], "Edited");
    }

    #[test]
    fn test_write_target_for_mode() {
        assert_eq!(WriteTarget::for_mode(DisplayMode::Edit, Some(4)), WriteTarget::Update(4));
        assert_eq!(WriteTarget::for_mode(DisplayMode::Edit, None), WriteTarget::Create);
        assert_eq!(WriteTarget::for_mode(DisplayMode::New, Some(4)), WriteTarget::Create);
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let store = Arc::new(MockStore::new());
        let sync = sync_with(&store);

        store.fail(
            MockOp::Write,
            MockFailure::Rejected {
                status: 400,
                body: r#"{"error":{"message":{"value":"The list is locked."}}}"#.into(),
            },
        );
        let outcome = sync.submit(&titled("x"), DisplayMode::New, None).await;
        assert_eq!(outcome.user_message(), "Error saving item: The list is locked.");

        store.fail(
            MockOp::Write,
            MockFailure::Rejected { status: 502, body: "Bad Gateway".into() },
        );
        let outcome = sync.submit(&titled("x"), DisplayMode::New, None).await;
        assert_eq!(outcome, SubmitOutcome::Rejected { message: "Bad Gateway".into() });

        store.fail(MockOp::Write, MockFailure::Transport);
        let outcome = sync.submit(&titled("x"), DisplayMode::New, None).await;
        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert!(outcome.user_message().starts_with("An unexpected error occurred: "));
    }

    #[tokio::test]
    async fn test_submit_blank_title_sends_nothing() {
        let store = Arc::new(MockStore::new());
        let outcome = sync_with(&store).submit(&titled("  "), DisplayMode::New, None).await;
        assert_eq!(outcome, SubmitOutcome::Invalid { message: "Required: Title".into() });
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_read_only_sends_nothing() {
        let store = Arc::new(MockStore::new());
        let outcome = sync_with(&store).submit(&titled("x"), DisplayMode::View, Some(1)).await;
        assert!(matches!(outcome, SubmitOutcome::Invalid { .. }));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_completion_saves_as_zero() {
        let store = Arc::new(MockStore::new());
        let record = Record {
            title: "x".into(),
            completion: Completion::parse_lossy("about half"),
            ..Record::default()
        };

        sync_with(&store).submit(&record, DisplayMode::New, None).await;
        assert_eq!(store.item(1).unwrap()["CompletionPercentage"], 0);
    }

    #[tokio::test]
    async fn test_round_trip_far_east_site_keeps_due_date() {
        let store = Arc::new(MockStore::new());
        let offset = FixedOffset::east_opt(13 * 3600).unwrap();
        let sync = sync_with(&store).with_site_offset(offset);
        let due = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let mut record = titled("Tonga rollout");
        record.due_date = Some(due);

        let mut id = None;
        for _ in 0..3 {
            assert!(sync.submit(&record, DisplayMode::Edit, id).await.is_saved());
            id = Some(1);
            record = sync.load(DisplayMode::Edit, id).await;
            assert_eq!(record.due_date, Some(due));
        }
        assert_eq!(store.item(1).unwrap()["DueDate"], "2024-04-30T11:00:00Z");
    }

    #[tokio::test]
    async fn test_round_trip_preserves_due_date() {
        let store = Arc::new(MockStore::new());
        let sync = sync_with(&store);
        let due = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let mut record = titled("Year end");
        record.due_date = Some(due);
        record.tags.insert(Tag::Database);
        record.classification = Some(1);
        record.sub_classifications.insert(10);

        assert!(sync.submit(&record, DisplayMode::New, None).await.is_saved());
        let echoed = sync.load(DisplayMode::Edit, Some(1)).await;

        assert_eq!(echoed.due_date, Some(due));
        assert_eq!(echoed, record);
    }
}
