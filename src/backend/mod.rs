//! Client side of the external catalog / SQL-agent service.
//!
//! Every piece of real work (answering questions, storing suppliers and
//! products) happens in that service. This module only describes the calls
//! the views make and provides the HTTP implementation.
//!
//! - [`Backend`]: the operations the views depend on
//! - [`HttpBackend`]: `reqwest` implementation against a fixed base URL
//! - [`BackendError`]: why a call failed (used for logging only)

mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{EntityId, NewProduct, NewSupplier, Product, Supplier};

pub use http::HttpBackend;

/// Why a call to the catalog service failed.
///
/// The views never branch on the variant: a failure is a failure. The detail
/// only ends up in log records.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure or undecodable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not the JSON we expected.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error` field of the body when present, otherwise the raw body.
        message: String,
    },

    /// Agent answered 2xx without a `final_answer` string.
    #[error("response has no final_answer")]
    MissingAnswer,
}

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Operations offered by the catalog / SQL-agent service.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// `POST /sql-agent` with `{ question }`, returning `final_answer`.
    async fn ask(&self, question: &str) -> Result<String>;

    /// `GET /suppliers`.
    async fn list_suppliers(&self) -> Result<Vec<Supplier>>;

    /// `POST /suppliers`. Returns the new id when the service reports one.
    async fn create_supplier(&self, supplier: &NewSupplier) -> Result<Option<EntityId>>;

    /// `GET /products`.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// `POST /products`. Returns the new id when the service reports one.
    async fn create_product(&self, product: &NewProduct) -> Result<Option<EntityId>>;
}
