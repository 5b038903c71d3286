use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time;

use crate::backoff::RetryPolicy;
use crate::error::ApiError;
use crate::redirect::{should_redirect, AuthRedirect};

pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const MAX_TIMEOUT: Duration = Duration::from_millis(120_000);

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend origin, e.g. `https://isirt.example.com`.
    pub base_url: String,
    pub api_prefix: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub login_route: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORIGIN.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
        }
    }
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    pub fn with_api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        self.api_prefix = api_prefix.into();
        self
    }
}

/// One file in a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub data: Bytes,
}

impl FilePart {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            field: field.into(),
            file_name,
            mime,
            data: data.into(),
        }
    }

    pub async fn from_path(field: impl Into<String>, path: &Path) -> Result<Self, ApiError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ApiError::InvalidRequest(format!("failed to read {}: {e}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(field, file_name, data))
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    /// Rebuilt into a fresh `multipart/form-data` body on every attempt.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Falls back to the client default; always clamped to [`MAX_TIMEOUT`].
    pub timeout: Option<Duration>,
    pub retries: bool,
    pub redirect_on_auth: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: true,
            redirect_on_auth: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API prefix, e.g. `/incidents/4`.
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub options: CallOptions,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            options: CallOptions::default(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("failed to encode body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    pub fn multipart(mut self, fields: Vec<(String, String)>, files: Vec<FilePart>) -> Self {
        self.body = RequestBody::Multipart { fields, files };
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn no_retry(mut self) -> Self {
        self.options.retries = false;
        self
    }

    pub fn no_auth_redirect(mut self) -> Self {
        self.options.redirect_on_auth = false;
        self
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    /// `None` for 204 and empty bodies.
    pub fn json_value(&self) -> Result<Option<Value>, ApiError> {
        if self.status == StatusCode::NO_CONTENT || self.body.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| self.malformed(e))
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.json_value()?.unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| self.malformed(e))
    }

    fn malformed(&self, err: serde_json::Error) -> ApiError {
        let snippet: String = String::from_utf8_lossy(&self.body).chars().take(200).collect();
        tracing::error!(
            status = self.status.as_u16(),
            "unexpected response body: {snippet}"
        );
        ApiError::Malformed {
            status: self.status.as_u16(),
            message: format!("unexpected response body: {err}"),
        }
    }
}

/// Shared HTTP plumbing: cookie jar, timeouts, retries and the 401 redirect.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    options: ClientOptions,
    redirect: Option<Arc<dyn AuthRedirect>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("options", &self.options)
            .field("redirect", &self.redirect.is_some())
            .finish()
    }
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        Url::parse(&options.base_url).map_err(|e| {
            ApiError::InvalidRequest(format!("invalid api url {}: {e}", options.base_url))
        })?;

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            jar,
            options,
            redirect: None,
        })
    }

    pub fn with_redirect(mut self, handler: Arc<dyn AuthRedirect>) -> Self {
        self.redirect = Some(handler);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Key under which this backend's session is persisted.
    pub fn origin(&self) -> String {
        self.options.base_url.trim_end_matches('/').to_string()
    }

    fn api_root(&self) -> String {
        let prefix = self.options.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            self.origin()
        } else {
            format!("{}/{prefix}", self.origin())
        }
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.api_root())
        } else {
            format!("{}/{endpoint}", self.api_root())
        }
    }

    pub fn effective_timeout(&self, options: &CallOptions) -> Duration {
        options.timeout.unwrap_or(self.options.timeout).min(MAX_TIMEOUT)
    }

    /// Cookie header the jar would send to the API, as `name=value; ...`.
    pub fn session_cookie(&self) -> Option<String> {
        let url = Url::parse(&format!("{}/", self.api_root())).ok()?;
        let header = self.jar.cookies(&url)?;
        header.to_str().ok().map(str::to_string)
    }

    pub fn restore_session_cookie<'a>(&self, pairs: impl IntoIterator<Item = &'a str>) {
        let Ok(url) = Url::parse(&format!("{}/", self.origin())) else {
            return;
        };
        for pair in pairs {
            self.jar.add_cookie_str(&format!("{pair}; Path=/"), &url);
        }
    }

    pub async fn send_value(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        self.execute(&request).await?.json_value()
    }

    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.execute(&request).await?.parse()
    }

    pub async fn send_bytes(&self, request: ApiRequest) -> Result<Bytes, ApiError> {
        Ok(self.execute(&request).await?.body)
    }

    pub async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(&request).await.map(|_| ())
    }

    pub async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let url = self.endpoint_url(&request.endpoint);
        let timeout = self.effective_timeout(&request.options);
        let policy = if request.options.retries {
            self.options.retry
        } else {
            RetryPolicy::single_attempt()
        };
        let max_attempts = policy.max_attempts.max(1);

        let mut attempt = 0;
        let result = loop {
            attempt += 1;
            match self.attempt_once(request, &url, timeout).await {
                Ok(response) => break Ok(response),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let backoff = policy.delay_after(attempt);
                    tracing::warn!(
                        "{} {url} failed (attempt {attempt}/{max_attempts}), retrying in {}ms: {err}",
                        request.method,
                        backoff.as_millis()
                    );
                    time::sleep(backoff).await;
                }
                Err(err) => break Err(err),
            }
        };

        if let Err(err) = &result {
            if err.is_auth() && request.options.redirect_on_auth {
                self.redirect_to_login();
            }
        }
        result
    }

    fn redirect_to_login(&self) {
        let Some(handler) = &self.redirect else {
            return;
        };
        let route = handler.current_route();
        if should_redirect(&route, &self.options.login_route) {
            tracing::info!(
                "session rejected on {route}, redirecting to {}",
                self.options.login_route
            );
            handler.redirect_to_login(&self.options.login_route);
        }
    }

    async fn attempt_once(
        &self,
        request: &ApiRequest,
        url: &str,
        timeout: Duration,
    ) -> Result<RawResponse, ApiError> {
        let timeout_ms = timeout.as_millis() as u64;
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .timeout(timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Multipart { fields, files } => {
                builder.multipart(multipart_form(fields, files)?)
            }
        };

        tracing::debug!("API request: {} {url}", request.method);
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout_ms))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout_ms))?;
        tracing::debug!("API response: {status} for {url}");

        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }
        Ok(RawResponse { status, body })
    }
}

fn multipart_form(fields: &[(String, String)], files: &[FilePart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in files {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type {}: {e}", file.mime)))?;
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpClient {
        HttpClient::new(ClientOptions::new(base_url)).unwrap()
    }

    #[test]
    fn endpoint_url_joins_prefix() {
        let http = client("https://isirt.example.com/");
        assert_eq!(
            http.endpoint_url("/incidents/4"),
            "https://isirt.example.com/api/v1/incidents/4"
        );
        assert_eq!(http.endpoint_url("me/"), "https://isirt.example.com/api/v1/me/");
    }

    #[test]
    fn empty_prefix_targets_origin() {
        let http = HttpClient::new(ClientOptions::new("http://localhost:8000").with_api_prefix(""))
            .unwrap();
        assert_eq!(http.endpoint_url("/me/"), "http://localhost:8000/me/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpClient::new(ClientOptions::new("not a url")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn timeout_is_clamped() {
        let http = client("http://localhost:8000");
        assert_eq!(http.effective_timeout(&CallOptions::default()), DEFAULT_TIMEOUT);

        let long = CallOptions {
            timeout: Some(Duration::from_secs(600)),
            ..CallOptions::default()
        };
        assert_eq!(http.effective_timeout(&long), MAX_TIMEOUT);
    }

    #[test]
    fn restored_cookie_is_sent_to_api() {
        let http = client("http://localhost:8000");
        assert!(http.session_cookie().is_none());

        http.restore_session_cookie(["access_token=abc"]);
        assert_eq!(http.session_cookie().as_deref(), Some("access_token=abc"));
    }

    #[test]
    fn empty_and_no_content_bodies_are_null() {
        let empty = RawResponse {
            status: StatusCode::OK,
            body: Bytes::new(),
        };
        assert!(empty.json_value().unwrap().is_none());

        let no_content = RawResponse {
            status: StatusCode::NO_CONTENT,
            body: Bytes::from_static(b"ignored"),
        };
        assert!(no_content.json_value().unwrap().is_none());
    }

    #[test]
    fn non_json_success_is_malformed() {
        let html = RawResponse {
            status: StatusCode::OK,
            body: Bytes::from_static(b"<html>proxy login</html>"),
        };
        let err = html.json_value().unwrap_err();
        assert!(matches!(err, ApiError::Malformed { status: 200, .. }));
    }

    #[test]
    fn file_part_guesses_mime() {
        let part = FilePart::new("evidence_files", "capture.png", Bytes::from_static(b"x"));
        assert_eq!(part.mime, "image/png");
        let unknown = FilePart::new("evidence_files", "dump.weird", Bytes::from_static(b"x"));
        assert_eq!(unknown.mime, "application/octet-stream");
    }

    #[test]
    fn request_builder_sets_options() {
        let request = ApiRequest::get("/me/").no_retry().no_auth_redirect();
        assert!(!request.options.retries);
        assert!(!request.options.redirect_on_auth);

        let request = ApiRequest::post("/x")
            .json(&serde_json::json!({"a": 1}))
            .unwrap()
            .timeout(Duration::from_secs(60));
        assert!(matches!(request.body, RequestBody::Json(_)));
        assert_eq!(request.options.timeout, Some(Duration::from_secs(60)));
    }
}
