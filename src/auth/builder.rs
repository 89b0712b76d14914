//! Header construction for the auth schemes

use super::types::AuthScheme;
use crate::content;

/// Build the full header list for a scheme: the scheme header (if the scheme
/// has one), then the negotiated `Content-Type` and `Accept` lines.
///
/// Unrecognized content symbols contribute an empty line rather than being
/// dropped, so a scheme call always yields exactly three entries.
pub fn build_headers(scheme: &AuthScheme, content_type: &str, accept: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if let Some(auth) = scheme.header_line() {
        lines.push(auth);
    }
    lines.push(content::content_type_header(content_type));
    lines.push(content::accept_header(accept));
    lines
}

/// Turn `(name, value)` pairs into `"Name: value"` lines, preserving order.
pub fn custom_header_lines<I, K, V>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    headers
        .into_iter()
        .map(|(name, value)| format!("{}: {}", name.as_ref(), value.as_ref()))
        .collect()
}
