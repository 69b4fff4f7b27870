//! The `ListStore` trait: every remote call a form session makes.

use crate::vocab::{DocumentSubType, DocumentType};
use crate::wire::{RecordItem, RecordPayload};
use async_trait::async_trait;
use listform_client::{Result, SiteUser};

/// Remote store backing one form.
///
/// Implementations may narrow `fetch_site_users` and `fetch_document_sub_types`
/// server-side; callers always filter the results again.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Read one record by item id.
    async fn fetch_record(&self, id: u64) -> Result<RecordItem>;

    /// Read the site principal directory.
    async fn fetch_site_users(&self) -> Result<Vec<SiteUser>>;

    /// Read the top-level classification vocabulary.
    async fn fetch_document_types(&self) -> Result<Vec<DocumentType>>;

    /// Read the second-level classification vocabulary for `parent_id`.
    async fn fetch_document_sub_types(&self, parent_id: u64) -> Result<Vec<DocumentSubType>>;

    /// Create a record.
    async fn create_record(&self, payload: &RecordPayload) -> Result<()>;

    /// Overwrite an existing record.
    async fn update_record(&self, id: u64, payload: &RecordPayload) -> Result<()>;
}
