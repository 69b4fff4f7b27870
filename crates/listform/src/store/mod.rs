//! Record store abstraction.
//!
//! - `HttpListStore`: the list-item REST API of a live site
//! - `MockStore`: in-memory store for testing

pub mod http;
pub mod mock;
pub mod traits;

pub use http::HttpListStore;
pub use mock::{MockStore, StoreCall};
pub use traits::ListStore;
