//! Stateless one-shot requests
//!
//! Same validation, encoding and failure folding as [`Client`](crate::Client),
//! without auth state, rate limiting or a stored result.

use crate::auth::HeaderSet;
use crate::http::{prepare, Outcome, RequestBody, RequestResult, Transport};
use crate::types::Method;
use tracing::warn;

/// Send one request over `transport` with the given header lines.
pub fn send(
    transport: &dyn Transport,
    method: Method,
    url: &str,
    headers: &[String],
    enable_length: bool,
    body: impl Into<RequestBody>,
) -> RequestResult {
    let mut header_set = HeaderSet::new();
    header_set.replace(headers.to_vec());

    match prepare(method, url, &mut header_set, body.into(), enable_length) {
        Ok(prepared) => {
            let tls_verify = prepared.request.tls_verify;
            let response = transport.execute(&prepared.request);
            Outcome::from_response(url, response, tls_verify, prepared.content_length)
                .collapse(url, tls_verify, prepared.content_length)
        }
        Err(e) => {
            warn!("{} {} failed: {}", method, url, e);
            Outcome::from_error(&e).collapse(url, false, None)
        }
    }
}
