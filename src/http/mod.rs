//! HTTP client module
//!
//! Provides the stateful [`Client`] and the pieces it coordinates.
//!
//! # Features
//!
//! - **Body Encoding**: URL-encoded, JSON, XML and multipart bodies chosen from the headers
//! - **Rate Limiting**: Count-then-reset window, or a governor token bucket
//! - **Pluggable Transport**: `reqwest::blocking` by default, any [`Transport`] in tests
//! - **Failure Folding**: Validation and transport failures stored as status 500

mod body;
mod client;
mod rate_limit;
mod transport;

pub use body::{
    encode_body, has_xml_declaration, json_encode, url_encode, BodyEncoding, BodyValue,
    EncodedBody, EncodingFlags, FilePart, RequestBody,
};
pub use client::{validate_url, Client, FailureKind, Outcome, RequestResult, FAILURE_STATUS};
pub(crate) use client::prepare;
pub use rate_limit::{RateLimiterConfig, Throttle, TokenBucketLimiter, WindowLimiter};
pub use transport::{
    ReqwestTransport, Transport, TransportBody, TransportRequest, TransportResponse,
    CONNECT_TIMEOUT, MAX_REDIRECTS,
};
