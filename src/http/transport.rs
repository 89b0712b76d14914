//! Transport: executes one HTTP exchange
//!
//! The executor hands a fully prepared [`TransportRequest`] to a
//! [`Transport`] and gets a [`TransportResponse`] back. A transport never
//! fails: connection problems are reported through
//! [`TransportResponse::error`], and non-2xx statuses are ordinary responses.

use super::body::BodyValue;
use crate::types::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// Connect timeout applied to every exchange
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

/// Body as the transport sends it
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TransportBody {
    /// No body
    #[default]
    Empty,
    /// Encoded bytes
    Bytes(Vec<u8>),
    /// Fields the transport turns into a multipart form with its own boundary
    Form(Vec<(String, BodyValue)>),
}

impl TransportBody {
    /// Byte length when known before sending. Forms have no fixed length
    /// until the transport picks a boundary.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            TransportBody::Empty => Some(0),
            TransportBody::Bytes(bytes) => Some(bytes.len()),
            TransportBody::Form(_) => None,
        }
    }
}

/// One fully prepared exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// `"Name: value"` lines, in order
    pub headers: Vec<String>,
    pub body: TransportBody,
    /// Verify the server certificate
    pub tls_verify: bool,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
}

/// What came back from one exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, 0 when no response was received
    pub status: u16,
    pub body: Option<Vec<u8>>,
    /// Empty unless the exchange failed
    pub error: String,
}

impl TransportResponse {
    /// A received response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Some(body.into()),
            error: String::new(),
        }
    }

    /// An exchange that produced no response
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: None,
            error: error.into(),
        }
    }

    /// Whether the exchange failed before any status was received
    pub fn is_failure(&self) -> bool {
        self.status == 0 && !self.error.is_empty()
    }
}

/// Executes one HTTP exchange per call, blocking until it completes
pub trait Transport: Send + Sync + std::fmt::Debug {
    fn execute(&self, request: &TransportRequest) -> TransportResponse;
}

// ============================================================================
// reqwest transport
// ============================================================================

/// [`Transport`] backed by `reqwest::blocking`.
///
/// A client is built per exchange because TLS verification, connect timeout
/// and redirect limit all come from the request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    user_agent: String,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            user_agent: format!("reqkit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ReqwestTransport {
    /// Create a transport with the default user agent
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    fn build_client(&self, request: &TransportRequest) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(request.connect_timeout)
            .timeout(None::<Duration>)
            .redirect(Policy::limited(request.max_redirects))
            .danger_accept_invalid_certs(!request.tls_verify)
            .build()
    }

    fn send(&self, request: &TransportRequest) -> reqwest::Result<TransportResponse> {
        let client = self.build_client(request)?;
        let mut builder = client.request(request.method.into(), &request.url);

        let is_form = matches!(request.body, TransportBody::Form(_));
        for line in &request.headers {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            // The form sets its own boundary.
            if name.is_empty() || (is_form && name.eq_ignore_ascii_case("content-type")) {
                continue;
            }
            builder = builder.header(name, value.trim());
        }

        builder = match &request.body {
            TransportBody::Empty => builder,
            TransportBody::Bytes(bytes) => builder.body(bytes.clone()),
            TransportBody::Form(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        debug!("{} {} -> {}", request.method, request.url, status);

        Ok(match response.bytes() {
            Ok(bytes) => TransportResponse::new(status, bytes.to_vec()),
            Err(e) => TransportResponse {
                status,
                body: None,
                error: error_chain(&e),
            },
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &TransportRequest) -> TransportResponse {
        self.send(request)
            .unwrap_or_else(|e| TransportResponse::failed(error_chain(&e)))
    }
}

fn build_form(fields: &[(String, BodyValue)]) -> reqwest::Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = match value {
            BodyValue::Json(serde_json::Value::String(text)) => {
                form.text(name.clone(), text.clone())
            }
            BodyValue::Json(serde_json::Value::Null) => form.text(name.clone(), String::new()),
            BodyValue::Json(other) => form.text(name.clone(), other.to_string()),
            BodyValue::File(file) => {
                let mut part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
                if let Some(mime) = &file.mime_type {
                    part = part.mime_str(mime)?;
                }
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

/// Error message including every source, e.g.
/// `error sending request for url (...): tcp connect error: Connection refused`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod transport_tests {
    use super::*;
    use crate::http::body::FilePart;

    #[test]
    fn test_transport_body_len() {
        assert_eq!(TransportBody::Empty.byte_len(), Some(0));
        assert_eq!(TransportBody::Bytes(b"abc".to_vec()).byte_len(), Some(3));
        assert_eq!(TransportBody::Form(Vec::new()).byte_len(), None);
    }

    #[test]
    fn test_failed_response() {
        let response = TransportResponse::failed("connection refused");
        assert!(response.is_failure());
        assert!(response.body.is_none());

        assert!(!TransportResponse::new(500, "oops").is_failure());
    }

    #[test]
    fn test_user_agent() {
        let transport = ReqwestTransport::new();
        assert_eq!(
            transport.user_agent,
            format!("reqkit/{}", env!("CARGO_PKG_VERSION"))
        );

        let transport = transport.with_user_agent("inventory-sync/2.1");
        assert_eq!(transport.user_agent, "inventory-sync/2.1");
    }

    #[test]
    fn test_form_rejects_bad_mime() {
        let fields = vec![(
            "file".to_string(),
            BodyValue::File(FilePart::new("a.bin", vec![1, 2]).with_mime("not a mime")),
        )];
        assert!(build_form(&fields).is_err());
    }

    #[test]
    fn test_unreachable_host_is_reported_not_raised() {
        let request = TransportRequest {
            method: Method::GET,
            url: "http://127.0.0.1:1/".to_string(),
            headers: vec![String::new(), "Accept: text/plain".to_string()],
            body: TransportBody::Empty,
            tls_verify: false,
            connect_timeout: Duration::from_secs(2),
            max_redirects: MAX_REDIRECTS,
        };

        let response = ReqwestTransport::new().execute(&request);
        assert!(response.is_failure());
        assert!(response.error.contains("error sending request"));
    }
}
