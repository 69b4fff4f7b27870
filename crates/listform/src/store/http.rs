//! `ListStore` over the list-item REST API.

use async_trait::async_trait;
use listform_client::{ItemQuery, ListStoreClient, ListStoreConfig, Result, SiteUser};

use super::traits::ListStore;
use crate::config::FormConfig;
use crate::error::FormError;
use crate::vocab::{DocumentSubType, DocumentType, PRINCIPAL_TYPE_USER};
use crate::wire::{RecordItem, RecordPayload};

/// Live store for one form
pub struct HttpListStore {
    client: ListStoreClient,
    config: FormConfig,
}

impl HttpListStore {
    pub fn new(client: ListStoreClient, config: FormConfig) -> std::result::Result<Self, FormError> {
        config.validate().map_err(FormError::Config)?;
        Ok(Self { client, config })
    }

    /// Build the HTTP client and the store in one step.
    pub fn connect(
        store: ListStoreConfig,
        config: FormConfig,
    ) -> std::result::Result<Self, FormError> {
        let client = ListStoreClient::new(store)?;
        Self::new(client, config)
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn query(&self, filter: impl FnOnce() -> String) -> ItemQuery {
        if self.config.server_side_filter {
            ItemQuery::new().with_filter(filter())
        } else {
            ItemQuery::new()
        }
    }
}

#[async_trait]
impl ListStore for HttpListStore {
    async fn fetch_record(&self, id: u64) -> Result<RecordItem> {
        self.client.get_item(&self.config.record_list, id).await
    }

    async fn fetch_site_users(&self) -> Result<Vec<SiteUser>> {
        let query = self.query(|| format!("PrincipalType eq {}", PRINCIPAL_TYPE_USER));
        self.client.site_users(&query).await
    }

    async fn fetch_document_types(&self) -> Result<Vec<DocumentType>> {
        self.client
            .list_items(&self.config.document_type_list, &ItemQuery::new())
            .await
    }

    async fn fetch_document_sub_types(&self, parent_id: u64) -> Result<Vec<DocumentSubType>> {
        let query = self.query(|| format!("DocTypeId eq {}", parent_id));
        self.client
            .list_items(&self.config.document_sub_type_list, &query)
            .await
    }

    async fn create_record(&self, payload: &RecordPayload) -> Result<()> {
        self.client.create_item(&self.config.record_list, payload).await
    }

    async fn update_record(&self, id: u64, payload: &RecordPayload) -> Result<()> {
        self.client
            .update_item(&self.config.record_list, id, payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer, server_side_filter: bool) -> HttpListStore {
        HttpListStore::connect(
            ListStoreConfig {
                site_url: server.uri(),
                ..Default::default()
            },
            FormConfig {
                server_side_filter,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sub_types_unfiltered_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_api/web/lists/getbytitle('DocumentSubType')/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"Id": 10, "Title": "A", "DocTypeId": 1},
                    {"Id": 11, "Title": "B", "DocTypeId": 2}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rows = store_for(&server, false).fetch_document_sub_types(1).await.unwrap();
        assert_eq!(rows.len(), 2);

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_server_side_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_api/web/siteusers"))
            .and(query_param("$filter", "PrincipalType eq 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"Id": 1, "Title": "Ada", "PrincipalType": 1}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let users = store_for(&server, true).fetch_site_users().await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_record_decodes_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_api/web/lists/getbytitle('VDMDemo')/items(5)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Id": 5, "Title": "Audit", "Tags": {"results": ["Backend"]}
            })))
            .mount(&server)
            .await;

        let item = store_for(&server, false).fetch_record(5).await.unwrap();
        assert_eq!(item.id, Some(5));
        assert_eq!(item.title.as_deref(), Some("Audit"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = HttpListStore::connect(
            ListStoreConfig::default(),
            FormConfig {
                record_list: String::new(),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(FormError::Config(_))));
    }
}
