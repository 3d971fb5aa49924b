//! `reqwest` implementation of [`Backend`].

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Backend, BackendError, Result};
use crate::domain::{EntityId, NewProduct, NewSupplier, Product, Supplier};

/// HTTP client for the catalog / SQL-agent service.
///
/// No authentication, retries or timeouts: every call is a single best-effort
/// request against the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AgentReply {
    final_answer: Option<String>,
}

impl HttpBackend {
    /// Create a client rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client with a custom `reqwest::Client`.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!(name: "backend.request", method = "GET", %url);
        let response = self.http.get(url).send().await?;
        let body = Self::success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: serde::Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        let url = self.url(path)?;
        debug!(name: "backend.request", method = "POST", %url);
        let response = self.http.post(url).json(body).send().await?;
        Self::success_body(response).await
    }

    /// Return the body of a 2xx response, or an [`BackendError::Api`].
    async fn success_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Pull the `error` field out of a `{ "error": "..." }` body, falling back
/// to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Read the id a create call reports (`supplier_id` / `product_id`), if any.
fn created_id(body: &str, field: &str) -> Option<EntityId> {
    let value: Value = serde_json::from_str(body).ok()?;
    let id = value.get(field)?;
    serde_json::from_value(id.clone()).ok()
}

#[async_trait]
impl Backend for HttpBackend {
    async fn ask(&self, question: &str) -> Result<String> {
        let body = self
            .post_json("sql-agent", &serde_json::json!({ "question": question }))
            .await?;
        let reply: AgentReply = serde_json::from_str(&body)?;
        reply.final_answer.ok_or(BackendError::MissingAnswer)
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        self.get_json("suppliers").await
    }

    async fn create_supplier(&self, supplier: &NewSupplier) -> Result<Option<EntityId>> {
        let body = self.post_json("suppliers", supplier).await?;
        Ok(created_id(&body, "supplier_id"))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        self.get_json("products").await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Option<EntityId>> {
        let body = self.post_json("products", product).await?;
        Ok(created_id(&body, "product_id"))
    }
}
