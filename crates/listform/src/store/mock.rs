//! In-memory store for testing.

use async_trait::async_trait;
use listform_client::{error_message, ClientError, Result, SiteUser};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use super::traits::ListStore;
use crate::vocab::{DocumentSubType, DocumentType};
use crate::wire::{RecordItem, RecordPayload};

/// Operation groups that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Record,
    Users,
    DocumentTypes,
    SubTypes,
    Write,
}

/// How a failing operation fails
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Store answers with `status` and `body`
    Rejected { status: u16, body: String },
    /// Connection drops before any status arrives
    Transport,
}

/// Call log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchRecord(u64),
    FetchUsers,
    FetchDocumentTypes,
    FetchSubTypes(u64),
    Create,
    Update(u64),
}

/// Mock store for testing.
///
/// Items are kept as the JSON the store would hold, so a written payload
/// reads back the way a real list echoes it. Sub-type reads return every row;
/// filtering is left to the caller.
pub struct MockStore {
    items: Mutex<BTreeMap<u64, serde_json::Value>>,
    next_id: Mutex<u64>,
    users: Vec<SiteUser>,
    document_types: Vec<DocumentType>,
    sub_types: Vec<DocumentSubType>,
    failures: Mutex<Vec<(MockOp, MockFailure)>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            users: Vec::new(),
            document_types: Vec::new(),
            sub_types: Vec::new(),
            failures: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_users(mut self, users: Vec<SiteUser>) -> Self {
        self.users = users;
        self
    }

    pub fn with_document_types(mut self, types: Vec<DocumentType>) -> Self {
        self.document_types = types;
        self
    }

    pub fn with_sub_types(mut self, sub_types: Vec<DocumentSubType>) -> Self {
        self.sub_types = sub_types;
        self
    }

    /// Seed an item as raw store JSON.
    pub fn with_item(self, id: u64, item: serde_json::Value) -> Self {
        if let Ok(mut items) = self.items.lock() {
            items.insert(id, item);
        }
        if let Ok(mut next) = self.next_id.lock() {
            *next = (*next).max(id + 1);
        }
        self
    }

    /// Make every later call in `op` fail.
    pub fn fail(&self, op: MockOp, failure: MockFailure) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.retain(|(o, _)| *o != op);
            failures.push((op, failure));
        }
    }

    /// Let `op` succeed again.
    pub fn recover(&self, op: MockOp) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.retain(|(o, _)| *o != op);
        }
    }

    /// Calls so far, oldest first
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Stored JSON for an item
    pub fn item(&self, id: u64) -> Option<serde_json::Value> {
        self.items.lock().ok().and_then(|items| items.get(&id).cloned())
    }

    /// Ids of all stored items
    pub fn item_ids(&self) -> HashSet<u64> {
        self.items
            .lock()
            .map(|items| items.keys().copied().collect())
            .unwrap_or_default()
    }

    fn record_call(&self, call: StoreCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check(&self, op: MockOp) -> Result<()> {
        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.iter().find(|(o, _)| *o == op).map(|(_, f)| f.clone()));

        match failure {
            None => Ok(()),
            Some(MockFailure::Rejected { status, body }) => Err(ClientError::Rejected {
                status,
                message: error_message(&body),
            }),
            Some(MockFailure::Transport) => {
                Err(ClientError::Transport("connection reset".to_string()))
            }
        }
    }

    fn store(&self, id: u64, payload: &RecordPayload) -> Result<()> {
        let mut value = serde_json::to_value(payload)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("__metadata");
            object.insert("Id".to_string(), serde_json::json!(id));
        }
        if let Ok(mut items) = self.items.lock() {
            items.insert(id, value);
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListStore for MockStore {
    async fn fetch_record(&self, id: u64) -> Result<RecordItem> {
        self.record_call(StoreCall::FetchRecord(id));
        self.check(MockOp::Record)?;

        let item = self
            .item(id)
            .ok_or_else(|| ClientError::NotFound(format!("item {}", id)))?;
        Ok(serde_json::from_value(item)?)
    }

    async fn fetch_site_users(&self) -> Result<Vec<SiteUser>> {
        self.record_call(StoreCall::FetchUsers);
        self.check(MockOp::Users)?;
        Ok(self.users.clone())
    }

    async fn fetch_document_types(&self) -> Result<Vec<DocumentType>> {
        self.record_call(StoreCall::FetchDocumentTypes);
        self.check(MockOp::DocumentTypes)?;
        Ok(self.document_types.clone())
    }

    async fn fetch_document_sub_types(&self, parent_id: u64) -> Result<Vec<DocumentSubType>> {
        self.record_call(StoreCall::FetchSubTypes(parent_id));
        self.check(MockOp::SubTypes)?;
        Ok(self.sub_types.clone())
    }

    async fn create_record(&self, payload: &RecordPayload) -> Result<()> {
        self.record_call(StoreCall::Create);
        self.check(MockOp::Write)?;

        let id = match self.next_id.lock() {
            Ok(mut next) => {
                let id = *next;
                *next += 1;
                id
            }
            Err(_) => return Err(ClientError::Config("mock store poisoned".to_string())),
        };
        self.store(id, payload)
    }

    async fn update_record(&self, id: u64, payload: &RecordPayload) -> Result<()> {
        self.record_call(StoreCall::Update(id));
        self.check(MockOp::Write)?;

        if !self.item_ids().contains(&id) {
            return Err(ClientError::Rejected {
                status: 404,
                message: format!("Item does not exist: {}", id),
            });
        }
        self.store(id, payload)
    }
}
