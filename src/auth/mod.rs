//! Authentication header module
//!
//! Supports: Bearer, API Key, Basic, plus free-form custom headers.
//!
//! Each scheme call replaces the client's whole [`HeaderSet`] with the scheme
//! header and the two negotiated content headers; only
//! [`HeaderSet::extend_custom`] adds to an existing set.

mod builder;
mod types;

pub use builder::{build_headers, custom_header_lines};
pub use types::{header_name, AuthScheme, HeaderSet};
