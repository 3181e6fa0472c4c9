use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conditional write rejected by store")]
    Conflict,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("store API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode store response: {0}")]
    Decode(String),
}

/// HTTP client for the PostgREST interface of the document store.
///
/// All requests carry the service key and a fixed timeout. A timed-out or
/// unreachable store surfaces as `StoreError::Unavailable`; a write rejected
/// by a store-side constraint surfaces as `StoreError::Conflict`.
pub struct StoreClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.store_url.clone(),
            service_key: config.store_service_key.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::Api {
                    status: 0,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::CONFLICT => StoreError::Conflict,
                StatusCode::NOT_FOUND => StoreError::NotFound(error_text),
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                    StoreError::Unavailable(error_text)
                }
                _ => StoreError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// POST a row and return the stored representation.
    ///
    /// The store enforces its own row constraints; a constraint rejection
    /// comes back as `StoreError::Conflict` and is authoritative.
    pub async fn insert_returning(&self, path: &str, body: Value) -> Result<Vec<Value>, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(Method::POST, path, Some(body), Some(headers))
            .await
    }

    /// PATCH matching rows and return the stored representations.
    pub async fn update_returning(&self, path: &str, body: Value) -> Result<Vec<Value>, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(Method::PATCH, path, Some(body), Some(headers))
            .await
    }
}
