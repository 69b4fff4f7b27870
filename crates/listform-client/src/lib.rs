//! Rust client for the list-item REST API of a hosted collaboration site
//!
//! Speaks the vendor dialect verbatim: lists are addressed by title, items by
//! numeric id, writes carry an entity-type marker and wrap multi-valued fields
//! as `{"results": [...]}`.
//!
//! # Example
//!
//! ```rust,no_run
//! use listform_client::{ListStoreClient, ListStoreConfig, ItemQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ListStoreClient::new(ListStoreConfig {
//!     site_url: "https://tenant.example.com/sites/pmo".into(),
//!     access_token: Some("token".into()),
//!     ..Default::default()
//! })?;
//!
//! let types: Vec<serde_json::Value> = client
//!     .list_items("DocumentType", &ItemQuery::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types
pub use client::ListStoreClient;
pub use error::{ClientError, Result};
pub use types::*;
