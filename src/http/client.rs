//! Stateful request client
//!
//! [`Client`] owns the header set, the rate limiter, the transport and the
//! result of the last request. Every request runs the same ordered steps:
//!
//! 1. record the URL
//! 2. consult the rate limiter (may block)
//! 3. validate the URL
//! 4. derive the encoding flags from the header set
//! 5. on a file payload, drop `Content-Type` so the transport sets the boundary
//! 6. URL- or JSON-encode a structured body
//! 7. check the XML declaration when XML is declared
//! 8. verify TLS iff the scheme is `https`
//! 9. append `Content-Length` when enabled
//! 10. run the transport
//! 11. store the outcome, collapsing failures into status 500
//! 12. count the request
//!
//! A client is meant for one caller at a time; share it across threads only
//! behind a lock.

use super::body::{encode_body, BodyEncoding, EncodingFlags, RequestBody};
use super::rate_limit::{RateLimiterConfig, Throttle, WindowLimiter};
use super::transport::{
    ReqwestTransport, Transport, TransportRequest, TransportResponse, CONNECT_TIMEOUT,
    MAX_REDIRECTS,
};
use crate::auth::{build_headers, custom_header_lines, AuthScheme, HeaderSet};
use crate::debug::{redact_headers, DebugSnapshot};
use crate::error::{Error, Result};
use crate::response::ResponseView;
use crate::types::Method;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Status reported for requests that failed before a response was received
pub const FAILURE_STATUS: u16 = 500;

// ============================================================================
// Results
// ============================================================================

/// Which kind of failure a status-500 result stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Caller input was rejected; nothing was sent
    Validation,
    /// The exchange itself failed
    Transport,
}

/// Result of the last request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResult {
    pub url: String,
    pub status_code: u16,
    pub body: Option<Vec<u8>>,
    pub transport_error: Option<String>,
    /// Byte length sent in `Content-Length`, if that header was added
    pub content_length: Option<usize>,
    pub tls_verified: bool,
    /// Set when `status_code` is the synthetic failure status
    pub failure: Option<FailureKind>,
}

impl RequestResult {
    /// Content length for display, `"N/A"` when none was sent
    pub fn content_length_display(&self) -> String {
        self.content_length
            .map_or_else(|| "N/A".to_string(), |len| len.to_string())
    }

    /// Whether the server answered with a 2xx status
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && (200..300).contains(&self.status_code)
    }

    /// Whether the request failed before a response was received
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Tagged result of one request, before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(RequestResult),
    ValidationError(String),
    TransportError(String),
}

impl Outcome {
    /// Classify an error raised while preparing a request
    pub fn from_error(err: &Error) -> Self {
        if err.is_validation() {
            Outcome::ValidationError(err.to_string())
        } else {
            Outcome::TransportError(err.to_string())
        }
    }

    /// Classify a transport reply. Any reply carrying a status is a success,
    /// whatever the status.
    pub fn from_response(
        url: &str,
        response: TransportResponse,
        tls_verified: bool,
        content_length: Option<usize>,
    ) -> Self {
        if response.is_failure() {
            return Outcome::TransportError(response.error);
        }
        Outcome::Success(RequestResult {
            url: url.to_string(),
            status_code: response.status,
            body: response.body,
            transport_error: Some(response.error).filter(|e| !e.is_empty()),
            content_length,
            tls_verified,
            failure: None,
        })
    }

    /// Failure kind, `None` on success
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::ValidationError(_) => Some(FailureKind::Validation),
            Outcome::TransportError(_) => Some(FailureKind::Transport),
        }
    }

    /// Fold into the stored result shape.
    ///
    /// Both failure kinds become status 500 with no body and the message in
    /// `transport_error`, so the status code alone does not tell a rejected
    /// URL from a refused connection. `failure` keeps the distinction.
    pub fn collapse(
        self,
        url: &str,
        tls_verified: bool,
        content_length: Option<usize>,
    ) -> RequestResult {
        let failure = self.failure_kind();
        match self {
            Outcome::Success(result) => result,
            Outcome::ValidationError(message) | Outcome::TransportError(message) => {
                RequestResult {
                    url: url.to_string(),
                    status_code: FAILURE_STATUS,
                    body: None,
                    transport_error: Some(message),
                    content_length,
                    tls_verified,
                    failure,
                }
            }
        }
    }
}

// ============================================================================
// Request preparation (steps 3-9)
// ============================================================================

/// A request ready for the transport
#[derive(Debug, Clone)]
pub(crate) struct Prepared {
    pub request: TransportRequest,
    pub encoding: BodyEncoding,
    pub content_length: Option<usize>,
}

/// Validate a URL: it must parse as an absolute URL with a host.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::invalid_url(url, e.to_string()))?;
    if !parsed.has_host() {
        return Err(Error::invalid_url(url, "URL has no host"));
    }
    Ok(parsed)
}

/// Run validation and encoding for one request. Strips `Content-Type` from
/// `headers` when the body carries a file payload.
pub(crate) fn prepare(
    method: Method,
    url: &str,
    headers: &mut HeaderSet,
    body: RequestBody,
    enable_length: bool,
) -> Result<Prepared> {
    let parsed = validate_url(url)?;

    let flags = EncodingFlags::from_headers(headers);

    let has_file = body.has_file();
    if has_file {
        let removed = headers.remove_named("Content-Type");
        debug!("File payload present, removed {} Content-Type header(s)", removed);
    }

    let encoded = encode_body(body, flags)?;

    let tls_verify = parsed.scheme() == "https";

    let mut lines = headers.as_slice().to_vec();
    let content_length = if enable_length && !has_file {
        encoded.body.byte_len()
    } else {
        None
    };
    if let Some(len) = content_length {
        lines.push(format!("Content-Length: {len}"));
    }

    Ok(Prepared {
        request: TransportRequest {
            method,
            url: url.to_string(),
            headers: lines,
            body: encoded.body,
            tls_verify,
            connect_timeout: CONNECT_TIMEOUT,
            max_redirects: MAX_REDIRECTS,
        },
        encoding: encoded.encoding,
        content_length,
    })
}

// ============================================================================
// Client
// ============================================================================

/// Stateful HTTP client
pub struct Client {
    transport: Box<dyn Transport>,
    headers: HeaderSet,
    auth: AuthScheme,
    enable_length: bool,
    throttle: Option<Box<dyn Throttle>>,
    url: Option<String>,
    tls_verified: bool,
    content_length: Option<usize>,
    last_encoding: Option<BodyEncoding>,
    request_count: u64,
    last: Option<RequestResult>,
    started: Instant,
    created_at: DateTime<Utc>,
}

impl Client {
    /// Create a client using the reqwest transport
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            headers: HeaderSet::new(),
            auth: AuthScheme::None,
            enable_length: false,
            throttle: None,
            url: None,
            tls_verified: false,
            content_length: None,
            last_encoding: None,
            request_count: 0,
            last: None,
            started: Instant::now(),
            created_at: Utc::now(),
        }
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// Use bearer auth. Replaces all headers.
    pub fn bearer(
        &mut self,
        enable_length: bool,
        content_type: &str,
        accept: &str,
        token: impl Into<String>,
    ) -> &mut Self {
        self.apply_scheme(AuthScheme::Bearer(token.into()), enable_length, content_type, accept)
    }

    /// Use API-key auth (`X-API-Key`). Replaces all headers.
    pub fn key(
        &mut self,
        enable_length: bool,
        content_type: &str,
        accept: &str,
        token: impl Into<String>,
    ) -> &mut Self {
        self.apply_scheme(AuthScheme::ApiKey(token.into()), enable_length, content_type, accept)
    }

    /// Use basic auth; `token` is base64-encoded. Replaces all headers.
    pub fn basic(
        &mut self,
        enable_length: bool,
        content_type: &str,
        accept: &str,
        token: impl Into<String>,
    ) -> &mut Self {
        self.apply_scheme(AuthScheme::Basic(token.into()), enable_length, content_type, accept)
    }

    /// Drop any auth scheme and keep only the negotiated content headers.
    pub fn negotiate(
        &mut self,
        enable_length: bool,
        content_type: &str,
        accept: &str,
    ) -> &mut Self {
        self.apply_scheme(AuthScheme::None, enable_length, content_type, accept)
    }

    fn apply_scheme(
        &mut self,
        scheme: AuthScheme,
        enable_length: bool,
        content_type: &str,
        accept: &str,
    ) -> &mut Self {
        self.enable_length = enable_length;
        self.headers
            .replace(build_headers(&scheme, content_type, accept));
        debug!("Auth scheme set to {}", scheme.name());
        self.auth = scheme;
        self
    }

    /// Append custom headers, keeping the existing ones.
    pub fn custom_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.headers.extend_custom(custom_header_lines(headers));
        if self.auth == AuthScheme::None {
            self.auth = AuthScheme::Custom;
        }
        self
    }

    /// Limit requests to `limit` per `window_seconds`, blocking when exceeded.
    pub fn rate_limit(&mut self, limit: u32, window_seconds: u64) -> &mut Self {
        let config = RateLimiterConfig::new(limit, window_seconds);
        self.throttle = Some(Box::new(WindowLimiter::new(&config)));
        self
    }

    /// Install a different rate-limit policy
    pub fn with_throttle(&mut self, throttle: Box<dyn Throttle>) -> &mut Self {
        self.throttle = Some(throttle);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(&mut self) -> &mut Self {
        self.throttle = None;
        self
    }

    // ------------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------------

    /// Make a GET request
    pub fn get(&mut self, url: &str) -> &RequestResult {
        self.request(Method::GET, url, RequestBody::Empty)
    }

    /// Make a POST request
    pub fn post(&mut self, url: &str, body: impl Into<RequestBody>) -> &RequestResult {
        self.request(Method::POST, url, body)
    }

    /// Make a PUT request
    pub fn put(&mut self, url: &str, body: impl Into<RequestBody>) -> &RequestResult {
        self.request(Method::PUT, url, body)
    }

    /// Make a DELETE request
    pub fn delete(&mut self, url: &str) -> &RequestResult {
        self.request(Method::DELETE, url, RequestBody::Empty)
    }

    /// Make a request. Never fails: failures are stored as status 500.
    pub fn request(
        &mut self,
        method: Method,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> &RequestResult {
        self.url = Some(url.to_string());

        if let Some(throttle) = self.throttle.as_mut() {
            throttle.acquire();
        }

        let outcome = self.execute(method, url, body.into());
        if let Outcome::ValidationError(message) | Outcome::TransportError(message) = &outcome {
            warn!("{} {} failed: {}", method, url, message);
        }
        let result = outcome.collapse(url, self.tls_verified, self.content_length);

        self.request_count += 1;
        if let Some(throttle) = self.throttle.as_mut() {
            throttle.record();
        }

        self.last.insert(result)
    }

    fn execute(&mut self, method: Method, url: &str, body: RequestBody) -> Outcome {
        let prepared = match prepare(method, url, &mut self.headers, body, self.enable_length) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.content_length = None;
                return Outcome::from_error(&e);
            }
        };

        self.tls_verified = prepared.request.tls_verify;
        self.content_length = prepared.content_length;
        self.last_encoding = Some(prepared.encoding);

        debug!(
            "{} {} (encoding: {:?}, tls_verify: {}, content_length: {:?})",
            method, url, prepared.encoding, prepared.request.tls_verify, prepared.content_length
        );

        let response = self.transport.execute(&prepared.request);
        Outcome::from_response(url, response, self.tls_verified, self.content_length)
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Active header lines
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Active auth scheme
    pub fn auth_scheme(&self) -> &AuthScheme {
        &self.auth
    }

    /// Whether `Content-Length` is added to requests
    pub fn length_enabled(&self) -> bool {
        self.enable_length
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.throttle.is_some()
    }

    /// URL of the last request, recorded even when the request failed
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// TLS verification flag of the last request that passed validation
    pub fn tls_verified(&self) -> bool {
        self.tls_verified
    }

    /// Content length of the last request
    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Body encoding of the last request that passed validation
    pub fn last_encoding(&self) -> Option<BodyEncoding> {
        self.last_encoding
    }

    /// Number of requests made, failed ones included
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Result of the last request
    pub fn last_result(&self) -> Option<&RequestResult> {
        self.last.as_ref()
    }

    /// Structured view of the last response
    pub fn response(&self) -> ResponseView<'_> {
        ResponseView::new(self.last.as_ref())
    }

    /// Redacted diagnostic view of the client
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let last = self.last.as_ref();
        DebugSnapshot {
            url: self.url.clone(),
            tls_verified: self.tls_verified,
            status_code: last.map(|r| r.status_code),
            transport_error: last.and_then(|r| r.transport_error.clone()),
            headers: redact_headers(self.headers.as_slice()),
            content_length: self
                .content_length
                .map_or_else(|| "N/A".to_string(), |len| len.to_string()),
            request_count: self.request_count,
            auth_scheme: self.auth.name(),
            encoding: self.last_encoding,
            created_at: self.created_at,
            elapsed: self.started.elapsed(),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("headers", &redact_headers(self.headers.as_slice()))
            .field("auth", &self.auth)
            .field("enable_length", &self.enable_length)
            .field("throttle", &self.throttle)
            .field("url", &self.url)
            .field("request_count", &self.request_count)
            .finish_non_exhaustive()
    }
}
