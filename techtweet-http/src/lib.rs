//! Minimal HTTP client with safe logging, opt-in retries, and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout, retries
//! - JSON, raw-bytes, multipart, and streaming helpers on one request core
//! - OAuth 1.0a signing for user-context endpoints (see [`oauth`])
//! - Redacts sensitive query params and never logs secret values
//! - Retries 429/5xx with exponential backoff and `Retry-After` support, but only
//!   when a caller asks for it: the default retry budget is zero
//! - Optional *raw* request/response logging via `TECHTWEET_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), techtweet_http::HttpError> {
//! let client = techtweet_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", techtweet_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/header/oauth1/none), not the secret.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! headers, body snippets (truncated), retries, final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `TECHTWEET_HTTP_RAW=1`.

pub mod oauth;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::pin::Pin;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

pub use oauth::OAuth1Credentials;
pub use reqwest::{Method, StatusCode, header};

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "TECHTWEET_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
/// Floor for 429 backoff when the server sends no `Retry-After`.
const MIN_THROTTLE_DELAY: Duration = Duration::from_millis(1100);

const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "apikey",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_key(k: &str) -> bool {
    SECRET_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str())
}

/// Query pairs of `url` with secret-looking values replaced.
fn redacted_query(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| {
            let shown = if is_secret_key(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), shown)
        })
        .collect()
}

/// Curl equivalent of a request for raw logs, with secrets redacted.
fn make_curl(
    method: &Method,
    url: &Url,
    headers: Option<&HeaderMap>,
    body: Option<&RequestBody>,
) -> String {
    let quote = |s: &str| s.replace('\'', r"'\''");
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];

    for (name, val) in headers.into_iter().flatten() {
        let shown = if is_sensitive_header(name.as_str()) {
            "<redacted>"
        } else {
            val.to_str().unwrap_or("")
        };
        parts.push(format!("-H '{}: {}'", name.as_str(), quote(shown)));
    }

    match body {
        Some(RequestBody::Json(bytes)) => match std::str::from_utf8(bytes) {
            Ok(text) if text.len() > RAW_MAX_BODY => {
                let cut: String = text.chars().take(RAW_MAX_BODY).collect();
                parts.push(format!("-d '{}…'", quote(&cut)));
            }
            Ok(text) => parts.push(format!("-d '{}'", quote(text))),
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        },
        Some(RequestBody::Multipart(fields)) => {
            parts.extend(fields.iter().map(|f| format!("-F '{}'", quote(&f.describe()))));
        }
        None => {}
    }

    let mut shown = url.clone();
    let pairs = redacted_query(url);
    if pairs.is_empty() {
        shown.set_query(None);
    } else {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

fn is_sensitive_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization") || name.eq_ignore_ascii_case("x-api-key")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if is_sensitive_header(&key) {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        /// Provider-specific error code when the body carries one
        /// (`errors[0].code` on X v1.1, `code` on NewsAPI).
        code: Option<String>,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`] errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Provider error code, falling back to the numeric HTTP status.
    pub fn code(&self) -> Option<String> {
        match self {
            HttpError::Api { status, code, .. } => {
                Some(code.clone().unwrap_or_else(|| status.as_u16().to_string()))
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use techtweet_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header (e.g., NewsAPI: X-Api-Key)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// OAuth 1.0a user context, signed per attempt.
    OAuth1(&'a OAuth1Credentials),
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::OAuth1(_) => "oauth1",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use techtweet_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(1),
///     auth: Some(Auth::Bearer("demo")),
///     query: Some(vec![("category", Cow::Borrowed("technology"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.allow_absolute == false);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

// ==============================
// Bodies
// ==============================

/// A file part of a `multipart/form-data` body. Owned so the form can be
/// rebuilt on every retry attempt.
#[derive(Clone, Debug)]
pub struct MultipartField {
    name: String,
    bytes: Bytes,
    mime: String,
    file_name: Option<String>,
}

impl MultipartField {
    pub fn file(name: impl Into<String>, bytes: Bytes, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime: mime.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    fn describe(&self) -> String {
        format!("{}=@- ({} bytes, {})", self.name, self.bytes.len(), self.mime)
    }

    fn to_part(&self) -> Result<reqwest::multipart::Part, HttpError> {
        let part = reqwest::multipart::Part::bytes(self.bytes.to_vec())
            .mime_str(&self.mime)
            .map_err(|e| HttpError::Build(format!("invalid mime type {}: {e}", self.mime)))?;
        Ok(match &self.file_name {
            Some(name) => part.file_name(name.clone()),
            None => part,
        })
    }
}

#[derive(Clone, Debug)]
enum RequestBody {
    Json(Vec<u8>),
    Multipart(Vec<MultipartField>),
}

/// Raw response body plus its declared content type.
#[derive(Clone, Debug)]
pub struct FetchedBytes {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Forward-only stream of body chunks from a streaming response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL. A trailing slash is added
    /// when missing so relative paths extend the base path instead of replacing
    /// its last segment.
    ///
    /// ```no_run
    /// use techtweet_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&normalized).map_err(|e| HttpError::Url(e.to_string()))?;
        let mut client = Self::detached()?;
        client.base = Some(base);
        Ok(client)
    }

    /// A client without a base URL; every path must be absolute.
    pub fn detached() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("techtweet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 0,
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget (zero) returned by [`HttpClient::new`].
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    // ==============================
    // Public helpers
    // ==============================

    /// GET JSON with per-request options (headers/query/auth/timeout/retries).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (req_id, resp) = self.send(Method::GET, path, None, opts).await?;
        decode_json(&req_id, resp).await
    }

    /// POST JSON with per-request options (headers/query/auth/timeout/retries).
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = json_body(body)?;
        let (req_id, resp) = self.send(Method::POST, path, Some(&body), opts).await?;
        decode_json(&req_id, resp).await
    }

    /// POST a `multipart/form-data` body and decode a JSON response.
    pub async fn post_multipart<T>(
        &self,
        path: &str,
        fields: Vec<MultipartField>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let body = RequestBody::Multipart(fields);
        let (req_id, resp) = self.send(Method::POST, path, Some(&body), opts).await?;
        decode_json(&req_id, resp).await
    }

    /// GET a raw body (images, feeds).
    pub async fn get_bytes(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<FetchedBytes, HttpError> {
        let (req_id, resp) = self.send(Method::GET, path, None, opts).await?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::warn!(req_id=%req_id, message=%e, "http.network_error.body");
            HttpError::Network(e.to_string())
        })?;
        tracing::debug!(req_id=%req_id, body_len=bytes.len(), ?content_type, "http.response.bytes");
        Ok(FetchedBytes {
            bytes,
            content_type,
        })
    }

    /// POST JSON and hand back the response body as a chunk stream.
    ///
    /// Status is checked before the stream is returned; errors that surface
    /// mid-stream arrive as `Err` items. Streams are never retried once the
    /// first chunk has been handed out.
    pub async fn post_json_stream<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<ByteStream, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let body = json_body(body)?;
        let (req_id, resp) = self.send(Method::POST, path, Some(&body), opts).await?;
        tracing::debug!(req_id=%req_id, "http.response.stream_open");
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| HttpError::Network(e.to_string())));
        Ok(Box::pin(stream))
    }

    // ==============================
    // Core request implementation
    // ==============================

    fn resolve_url(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        let Some(base) = &self.base else {
            return Url::parse(path).map_err(|e| HttpError::Url(e.to_string()));
        };
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// Final URL with query params appended. Built once
    /// so every attempt, and its OAuth signature, sees the same target.
    fn target_url(&self, path: &str, opts: &RequestOpts<'_>) -> Result<Url, HttpError> {
        let mut url = self.resolve_url(path, opts.allow_absolute)?;
        if let Some(query) = opts.query.as_ref().filter(|q| !q.is_empty()) {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        }
        Ok(url)
    }

    fn build_request(
        &self,
        method: &Method,
        target: &Url,
        body: Option<&RequestBody>,
        opts: &RequestOpts<'_>,
        timeout: Duration,
    ) -> Result<reqwest::RequestBuilder, HttpError> {
        let mut rb = self
            .inner
            .request(method.clone(), target.clone())
            .timeout(timeout);

        rb = match body {
            Some(RequestBody::Json(bytes)) => rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            Some(RequestBody::Multipart(fields)) => {
                let form = fields
                    .iter()
                    .try_fold(reqwest::multipart::Form::new(), |form, f| {
                        Ok::<_, HttpError>(form.part(f.name.clone(), f.to_part()?))
                    })?;
                rb.multipart(form)
            }
            None => rb,
        };

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        rb = match &opts.auth {
            Some(Auth::Bearer(tok)) => rb.bearer_auth(sanitize_api_key(tok)?),
            Some(Auth::Header { name, value }) => rb.header(name, value),
            Some(Auth::OAuth1(creds)) => rb.header(
                reqwest::header::AUTHORIZATION,
                oauth::authorization_header(creds, method, target, &[]),
            ),
            Some(Auth::None) | None => rb,
        };
        Ok(rb)
    }

    /// Send with retries; returns the successful response with its body unread.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&RequestBody>,
        opts: RequestOpts<'_>,
    ) -> Result<(String, Response), HttpError> {
        let target = self.target_url(path, &opts)?;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let auth_kind = opts.auth.as_ref().map_or("none", Auth::kind);
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let can_retry = attempt <= max_retries;
            let req_id = format!("r{}", uuid::Uuid::new_v4().simple());
            let rb = self.build_request(&method, &target, body, &opts, timeout)?;

            tracing::debug!(
                req_id=%req_id,
                attempt,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", target.host_str().unwrap_or("-"), target.path()),
                query=?redacted_query(&target),
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                has_body=body.is_some(),
                "http.request.start"
            );
            if raw_enabled() {
                let curl = make_curl(&method, &target, opts.headers.as_ref(), body);
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            let started = Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) if can_retry => {
                    let delay = backoff(attempt);
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        backoff_ms=delay.as_millis() as u64,
                        message=%err,
                        "http.retrying.network_send"
                    );
                    sleep(delay).await;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(req_id=%req_id, attempt, message=%err, "http.network_error.send");
                    return Err(HttpError::Network(err.to_string()));
                }
            };

            let meta = ResponseMeta::read(&resp, started);
            meta.log(&req_id);
            if meta.status.is_success() {
                return Ok((req_id, resp));
            }

            let bytes = resp.bytes().await.unwrap_or_default();
            meta.log_raw_body(&req_id, &bytes);
            let detail = extract_error_detail(&bytes);
            let snippet = snip_body(&bytes);

            if let Some(delay) = meta.retry_delay(attempt).filter(|_| can_retry) {
                tracing::warn!(
                    req_id=%req_id,
                    status=%meta.status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%detail.message,
                    body_snippet=%snippet,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                status=%meta.status,
                message=%detail.message,
                code=?detail.code,
                x_request_id=%meta.request_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status: meta.status,
                message: detail.message,
                code: detail.code,
                request_id: meta.request_id,
            });
        }
    }
}

/// What the client keeps from response headers for logging and retry decisions.
struct ResponseMeta {
    status: StatusCode,
    headers: HeaderMap,
    request_id: String,
    elapsed_ms: u64,
}

impl ResponseMeta {
    fn read(resp: &Response, started: Instant) -> Self {
        let headers = resp.headers().clone();
        let request_id = ["x-request-id", "x-correlation-id", "x-transaction-id"]
            .iter()
            .find_map(|h| headers.get(*h).and_then(|v| v.to_str().ok()))
            .unwrap_or("-")
            .to_string();
        Self {
            status: resp.status(),
            headers,
            request_id,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn log(&self, req_id: &str) {
        tracing::debug!(
            req_id=%req_id,
            status=%self.status,
            duration_ms=self.elapsed_ms,
            x_request_id=%self.request_id,
            rate_limit.limit=?self.header("x-rate-limit-limit"),
            rate_limit.remaining=?self.header("x-rate-limit-remaining"),
            rate_limit.reset=?self.header("x-rate-limit-reset"),
            "http.response.headers"
        );
        if raw_enabled() && self.status.is_success() {
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%self.status,
                duration_ms=self.elapsed_ms,
                headers=?redact_headers(&self.headers),
                "response"
            );
        }
    }

    fn log_raw_body(&self, req_id: &str, bytes: &[u8]) {
        if !raw_enabled() {
            return;
        }
        let truncated = bytes.len() > RAW_MAX_BODY;
        let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
        tracing::info!(
            target: "http.raw",
            %req_id,
            status=%self.status,
            duration_ms=self.elapsed_ms,
            headers=?redact_headers(&self.headers),
            body=%text,
            truncated,
            "response"
        );
    }

    /// Delay before the next attempt, for statuses worth retrying (429, 5xx).
    fn retry_delay(&self, attempt: usize) -> Option<Duration> {
        let throttled = self.status == StatusCode::TOO_MANY_REQUESTS;
        if !throttled && !self.status.is_server_error() {
            return None;
        }
        if let Some(secs) = retry_after_delay_secs(&self.headers) {
            return Some(Duration::from_secs(secs));
        }
        let exp = backoff(attempt);
        Some(if throttled {
            exp.max(MIN_THROTTLE_DELAY)
        } else {
            exp
        })
    }
}

// ==============================
// Helpers
// ==============================

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, HttpError> {
    serde_json::to_vec(body)
        .map(RequestBody::Json)
        .map_err(|e| HttpError::Build(format!("body serialization failed: {e}")))
}

async fn decode_json<T: DeserializeOwned>(req_id: &str, resp: Response) -> Result<T, HttpError> {
    let bytes = resp.bytes().await.map_err(|e| {
        tracing::warn!(req_id=%req_id, message=%e, "http.network_error.body");
        HttpError::Network(e.to_string())
    })?;
    let snippet = snip_body(&bytes);
    tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

    serde_json::from_slice::<T>(&bytes).map_err(|e| {
        tracing::warn!(
            req_id=%req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

fn backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(16) as u32;
    Duration::from_millis(200u64.saturating_mul(1u64 << shift))
}

struct ErrorDetail {
    message: String,
    code: Option<String>,
}

fn extract_error_detail(body: &[u8]) -> ErrorDetail {
    // OpenAI/Groq style: {"error":{"message":"...","code":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
        #[serde(default)]
        code: Option<serde_json::Value>,
    }

    // X: {"errors":[{"code":32,"message":"...", "detail":"...", "title":"..."}]}
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        code: Option<serde_json::Value>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // Generic: {"message":"...","code":"..."} or {"detail":"...","title":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        error: Option<serde_json::Value>,
        #[serde(default)]
        code: Option<serde_json::Value>,
    }

    fn code_string(v: Option<serde_json::Value>) -> Option<String> {
        match v? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return ErrorDetail {
            message: env.error.message,
            code: code_string(env.error.code),
        };
    }
    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            let message = [first.message, first.detail, first.title]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or_default();
            return ErrorDetail {
                message,
                code: code_string(first.code),
            };
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        let error = match m.error {
            Some(serde_json::Value::String(s)) => s,
            _ => String::new(),
        };
        if let Some(message) = [m.message, m.detail, error, m.title]
            .into_iter()
            .find(|s| !s.is_empty())
        {
            return ErrorDetail {
                message,
                code: code_string(m.code),
            };
        }
    }
    ErrorDetail {
        message: snip_body(body),
        code: None,
    }
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let snip = String::from_utf8_lossy(body);
    if snip.chars().count() > 500 {
        let mut cut: String = snip.chars().take(500).collect();
        cut.push_str("...");
        cut
    } else {
        snip.into_owned()
    }
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
