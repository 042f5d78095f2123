use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult, body_preview};
use crate::session::SessionStore;

/// Shared plumbing for every operation: one reqwest client, the service
/// base URL, and the session store auth operations write through.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
        })
    }

    /// Service root every endpoint is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The store signup and login persist into; `clear` it to sign out locally.
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    // Join path segments onto the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(request).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(&self, url: Url, body: &Value) -> ApiResult<T> {
        self.execute(self.http.post(url).json(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url, body: &Value) -> ApiResult<T> {
        self.execute(self.http.delete(url).json(body)).await
    }

    // One round trip: dispatch, surface non-success statuses, decode strictly.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let request = request.build()?;
        tracing::debug!("{} {}", request.method(), request.url());
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = body_preview(&body);
            tracing::warn!("request rejected with {}: {}", status, message);
            return Err(ApiError::Status { status, message });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}
