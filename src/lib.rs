// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # reqkit
//!
//! A small, stateful HTTP client for talking to JSON-ish APIs from
//! synchronous code.
//!
//! ## Features
//!
//! - **Auth header builders**: Bearer, API key and Basic, each paired with
//!   negotiated `Content-Type` / `Accept` headers
//! - **Body encoding**: JSON, URL-encoded forms, XML passthrough, multipart uploads
//! - **Rate limiting**: fixed-window limiter that blocks the caller
//! - **Uniform results**: every call yields a status, body and error text,
//!   never a panic
//! - **Response helpers**: JSON decoding, `{"data": ...}` wrapping, save to file
//! - **Redacted diagnostics**: a debug snapshot that never leaks credentials
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reqkit::Client;
//! use serde_json::json;
//!
//! let mut client = Client::new();
//! client.bearer(true, "json", "json", "my-token").rate_limit(10, 60);
//!
//! let result = client.post("https://api.example.com/items", json!({"name": "widget"}));
//! println!("{} {:?}", result.status_code, result.transport_error);
//!
//! let data = client.response().as_map();
//! println!("{data}");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Client                              │
//! │  bearer/key/basic → headers    get/post/put/delete → result  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────┬───────────┬──────┴──────┬────────────┬───────────┐
//! │   Auth   │  Content  │  Throttle   │ Transport  │ Response  │
//! ├──────────┼───────────┼─────────────┼────────────┼───────────┤
//! │ Bearer   │ json      │ Window      │ reqwest    │ as_map    │
//! │ API key  │ url       │ Token bucket│ TLS policy │ as_json   │
//! │ Basic    │ form-data │             │ redirects  │ save_file │
//! │ Custom   │ text/xml  │             │            │ debug     │
//! └──────────┴───────────┴─────────────┴────────────┴───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Content-type symbols and MIME mapping
pub mod content;

/// Auth header construction
pub mod auth;

/// Request executor, body encoding, transport and rate limiting
pub mod http;

/// Views over the last response
pub mod response;

/// Redacted client snapshots
pub mod debug;

/// Stateless single requests
pub mod oneshot;

/// Common validation regexes
pub mod patterns;

/// YAML/JSON client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::AuthScheme;
pub use config::ClientConfig;
pub use content::ContentType;
pub use debug::DebugSnapshot;
pub use http::{Client, FailureKind, FilePart, RequestBody, RequestResult};
pub use response::{ResponseView, SaveOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
