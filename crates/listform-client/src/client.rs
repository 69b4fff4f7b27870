//! HTTP client for the list-item REST API

use crate::error::{ClientError, Result};
use crate::types::*;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const VERBOSE_JSON: &str = "application/json;odata=verbose";
const NOMETADATA_JSON: &str = "application/json;odata=nometadata";

/// HTTP client for the list-item REST API
///
/// # Example
///
/// ```rust,no_run
/// use listform_client::{ListStoreClient, ListStoreConfig, ItemQuery, SiteUser};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ListStoreClient::new(ListStoreConfig {
///     site_url: "https://tenant.example.com/sites/pmo".into(),
///     ..Default::default()
/// })?;
///
/// let users: Vec<SiteUser> = client.site_users(&ItemQuery::new()).await?;
/// let item: serde_json::Value = client.get_item("VDMDemo", 7).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ListStoreClient {
    config: ListStoreConfig,
    client: Client,
}

impl ListStoreClient {
    /// Create a new list store client
    pub fn new(config: ListStoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = config.access_token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::Config(format!("access token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    /// Site URL without a trailing slash
    pub fn site_url(&self) -> &str {
        self.config.site_url.trim_end_matches('/')
    }

    // ==================== URLs ====================

    /// `.../_api/web/lists/getbytitle('{list}')/items`
    pub fn items_url(&self, list: &str) -> String {
        // Single quotes inside an OData string literal are doubled.
        let escaped = list.replace('\'', "''");
        format!(
            "{}/_api/web/lists/getbytitle('{}')/items",
            self.site_url(),
            urlencoding::encode(&escaped)
        )
    }

    /// `.../_api/web/lists/getbytitle('{list}')/items({id})`
    pub fn item_url(&self, list: &str, id: u64) -> String {
        format!("{}({})", self.items_url(list), id)
    }

    /// `.../_api/web/siteusers`
    pub fn site_users_url(&self) -> String {
        format!("{}/_api/web/siteusers", self.site_url())
    }

    // ==================== Reads ====================

    /// Read a single list item
    pub async fn get_item<T: DeserializeOwned>(&self, list: &str, id: u64) -> Result<T> {
        let url = self.item_url(list, id);
        tracing::debug!(%url, "GET item");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, NOMETADATA_JSON)
            .send()
            .await?;

        let value: serde_json::Value = self.handle_response(response).await?;
        Ok(decode_entity(value)?)
    }

    /// Read every item of a list (no paging)
    pub async fn list_items<T: DeserializeOwned>(
        &self,
        list: &str,
        query: &ItemQuery,
    ) -> Result<Vec<T>> {
        let url = self.items_url(list);
        self.get_collection(&url, query).await
    }

    /// Read the site principal directory
    pub async fn site_users<T: DeserializeOwned>(&self, query: &ItemQuery) -> Result<Vec<T>> {
        let url = self.site_users_url();
        self.get_collection(&url, query).await
    }

    // ==================== Writes ====================

    /// Create a list item (POST to the collection)
    pub async fn create_item<B: Serialize + ?Sized>(&self, list: &str, body: &B) -> Result<()> {
        let url = self.items_url(list);
        tracing::debug!(%url, "POST item");

        let response = self
            .write_request(self.client.post(&url))
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        self.handle_write(response).await
    }

    /// Update a list item in place (PATCH, unconditional)
    pub async fn update_item<B: Serialize + ?Sized>(
        &self,
        list: &str,
        id: u64,
        body: &B,
    ) -> Result<()> {
        let url = self.item_url(list, id);
        tracing::debug!(%url, "PATCH item");

        let response = self
            .write_request(self.client.patch(&url))
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        self.handle_write(response).await
    }

    // ==================== Helper Methods ====================

    async fn get_collection<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &ItemQuery,
    ) -> Result<Vec<T>> {
        tracing::debug!(%url, filter = ?query.filter, "GET collection");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, NOMETADATA_JSON)
            .query(&query.to_params())
            .send()
            .await?;

        let collection: Collection<T> = self.handle_response(response).await?;
        Ok(collection.into_vec())
    }

    fn write_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(header::ACCEPT, VERBOSE_JSON)
            .header(header::CONTENT_TYPE, VERBOSE_JSON)
            .header("odata-version", "")
            .header(header::IF_MATCH, "*")
    }

    async fn handle_write(&self, response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            let url = response.url().to_string();
            return Err(ClientError::NotFound(url));
        }

        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }

        let body = response.json().await?;
        Ok(body)
    }

    async fn rejection(&self, response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::Rejected {
            status,
            message: error_message(&body),
        }
    }
}
