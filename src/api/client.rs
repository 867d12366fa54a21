//! Authenticated request wrapper.
//!
//! Every outbound API call goes through [`ApiClient::fetch`], which injects
//! the JSON content type, locale and bearer headers, seals JSON bodies into an
//! Encrypted Envelope, and handles a 401 with exactly one silent refresh
//! followed by one retry. When that fails the session is cleared and
//! [`AuthEvent::Expired`] is emitted once.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use super::endpoints;
use super::refresh::{self, RefreshOutcome};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::crypto::envelope::{self, PayloadCipher};
use crate::error::{fallback_payload, ApiError};
use crate::events::AuthEvent;
use crate::session::Session;

/// Method, extra headers and serialized JSON body of one logical call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204, `Content-Length: 0`, or an empty body.
    NoContent,
    Json(Value),
}

impl ApiResponse {
    /// Deserialize the body. `NoContent` deserializes from `null`, so it
    /// satisfies `()` and `Option<_>` targets.
    pub fn into_json<R: DeserializeOwned>(self) -> Result<R, ApiError> {
        let value = match self {
            ApiResponse::NoContent => Value::Null,
            ApiResponse::Json(value) => value,
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    session: Arc<Session>,
    cipher: PayloadCipher,
    /// Serializes refreshes so concurrent 401s share one rotation.
    refresh_lock: Mutex<()>,
}

impl ApiClient<HttpTransport> {
    /// Create a reqwest-backed client from configuration.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Self {
        let transport = HttpTransport::new(config.timeout, config.connect_timeout);
        Self::with_transport(
            transport,
            &config.api_url,
            PayloadCipher::new(&config.payload_secret),
            session,
        )
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(
        transport: T,
        base_url: &str,
        cipher: PayloadCipher,
        session: Arc<Session>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            cipher,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one logical API call, including at most one refresh and retry.
    pub async fn fetch(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let mut allow_retry = true;

        loop {
            let sent_token = self.session.access_token().await;
            let request = self.build_request(path, &options, sent_token.as_deref()).await;
            let resp = self.transport.send(request).await?;

            if resp.is_success() {
                return parse_success(resp);
            }

            let status = resp.status;
            let data = parse_error_payload(&resp);

            if status != 401 {
                log::debug!("{} {} failed with status {}", options.method, path, status);
                return Err(ApiError::Http { status, data });
            }

            if endpoints::is_login(path) {
                return Err(ApiError::LoginRejected { data });
            }

            if allow_retry {
                allow_retry = false;
                if self.refresh_after_unauthorized(sent_token.as_deref()).await {
                    log::info!("Retrying {} {} with refreshed credentials", options.method, path);
                    continue;
                }
            }

            self.expire_session().await;
            return Err(ApiError::Unauthorized { status, data });
        }
    }

    /// Refresh the session now, outside of any 401 handling.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;
        refresh::refresh_session(&self.transport, &self.base_url, &self.session).await
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.fetch(path, RequestOptions::get()).await?.into_json()
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await?.into_json()
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await?.into_json()
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, body).await?.into_json()
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.fetch(path, RequestOptions::new(Method::DELETE)).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.fetch(path, RequestOptions::new(method).with_body(body)).await
    }

    /// Returns true when the request should be retried with the current token.
    ///
    /// A caller that waited on the lock while another request rotated the
    /// access token retries without a second refresh call.
    pub(super) async fn refresh_after_unauthorized(&self, stale_token: Option<&str>) -> bool {
        let _guard = self.refresh_lock.lock().await;

        let current = self.session.access_token().await;
        if current.is_some() && current.as_deref() != stale_token {
            log::debug!("Access token already rotated by a concurrent refresh");
            return true;
        }

        let outcome = refresh::refresh_session(&self.transport, &self.base_url, &self.session).await;
        if !outcome.is_refreshed() {
            log::info!("Refresh after 401 did not succeed: {:?}", outcome);
        }
        outcome.is_refreshed()
    }

    async fn expire_session(&self) {
        log::warn!("Session expired, clearing credentials");
        self.session.clear().await;
        self.session.events().emit(AuthEvent::Expired);
    }

    async fn build_request(
        &self,
        path: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> HttpRequest {
        let locale = self.session.locale().await;

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Locale".to_string(), locale.clone()),
            ("Accept-Language".to_string(), locale),
        ];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            method: options.method.clone(),
            url: self.url_for(path),
            headers,
            body: options.body.as_deref().map(|body| self.encode_body(path, body)),
        }
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Wire body for one attempt. Falls back to the plaintext body whenever
    /// the envelope cannot or must not be applied.
    fn encode_body(&self, path: &str, body: &str) -> String {
        if envelope::is_upload_path(path) {
            return body.to_string();
        }

        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Body for {} is not JSON, sending as-is: {}", path, e);
                return body.to_string();
            }
        };

        if envelope::has_oversized_inline_file(&value) {
            log::debug!("Inline file in body for {} exceeds envelope limit, sending as-is", path);
            return body.to_string();
        }

        match self
            .cipher
            .seal_envelope(&value)
            .map_err(|e| e.to_string())
            .and_then(|env| serde_json::to_string(&env).map_err(|e| e.to_string()))
        {
            Ok(wire) => wire,
            Err(e) => {
                log::warn!("Payload encryption failed for {}, sending plaintext: {}", path, e);
                body.to_string()
            }
        }
    }
}

fn parse_success(resp: HttpResponse) -> Result<ApiResponse, ApiError> {
    if resp.has_no_content() || resp.body.trim().is_empty() {
        return Ok(ApiResponse::NoContent);
    }
    serde_json::from_str(&resp.body)
        .map(ApiResponse::Json)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_error_payload(resp: &HttpResponse) -> Value {
    serde_json::from_str(&resp.body).unwrap_or_else(|_| fallback_payload(resp.status))
}
