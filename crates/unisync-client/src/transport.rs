//! JSON-over-HTTP transport.
//!
//! [`ApiClient`] resolves endpoint paths against the configured base address,
//! attaches the bearer token from its [`Credentials`], and turns non-2xx
//! responses into [`ClientError::Server`] carrying the server's `detail`
//! message (or a generic status message).

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use unisync_shared::protocol::ErrorBody;

use crate::credentials::Credentials;
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Absolute URL of `endpoint`; a missing leading `/` is added.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Perform a request and decode the JSON response body.
    pub async fn fetch<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint);
        debug!(%method, %url, authenticated = self.credentials.is_authenticated(), "API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let raw = response.bytes().await.unwrap_or_default();
            let message = ErrorBody::detail_from(&raw)
                .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
            debug!(%method, %url, status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::server(status.as_u16(), message));
        }

        let raw = response.bytes().await?;
        serde_json::from_slice(&raw).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.fetch::<T, ()>(Method::GET, endpoint, None).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.fetch(Method::POST, endpoint, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.fetch::<T, ()>(Method::DELETE, endpoint, None).await
    }
}
