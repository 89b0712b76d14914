//! Auth and header types

use base64::Engine as _;
use std::fmt;

/// Active authentication scheme.
///
/// At most one of `Bearer`, `ApiKey` and `Basic` is active; the last builder
/// call wins. `Custom` marks a client that only carries custom headers.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// No authentication header
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `X-API-Key: <token>`
    ApiKey(String),
    /// `Authorization: Basic <base64(token)>`, token is usually `user:password`
    Basic(String),
    /// Authentication is carried by caller-supplied custom headers
    Custom,
}

impl AuthScheme {
    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            AuthScheme::None => "none",
            AuthScheme::Bearer(_) => "bearer",
            AuthScheme::ApiKey(_) => "key",
            AuthScheme::Basic(_) => "basic",
            AuthScheme::Custom => "custom",
        }
    }

    /// Header line for this scheme, if it produces one.
    ///
    /// Tokens are not validated: an empty token still yields a header.
    pub fn header_line(&self) -> Option<String> {
        match self {
            AuthScheme::None | AuthScheme::Custom => None,
            AuthScheme::Bearer(token) => Some(format!("Authorization: Bearer {token}")),
            AuthScheme::ApiKey(token) => Some(format!("X-API-Key: {token}")),
            AuthScheme::Basic(token) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(token);
                Some(format!("Authorization: Basic {encoded}"))
            }
        }
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::None => f.write_str("None"),
            AuthScheme::Custom => f.write_str("Custom"),
            AuthScheme::Bearer(_) => f.write_str("Bearer(..)"),
            AuthScheme::ApiKey(_) => f.write_str("ApiKey(..)"),
            AuthScheme::Basic(_) => f.write_str("Basic(..)"),
        }
    }
}

/// Ordered list of raw `"Name: value"` header lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    lines: Vec<String>,
}

impl HeaderSet {
    /// Create an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every line
    pub fn replace(&mut self, lines: Vec<String>) {
        self.lines = lines;
    }

    /// Append lines, keeping the existing ones
    pub fn extend_custom<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.extend(lines);
    }

    /// Remove every line whose name matches `name` (ASCII case-insensitive).
    /// Returns how many lines were removed.
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.lines.len();
        self.lines
            .retain(|line| !header_name(line).is_some_and(|n| n.eq_ignore_ascii_case(name)));
        before - self.lines.len()
    }

    /// Whether any line contains `needle` verbatim
    pub fn contains_text(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Borrow the lines in order
    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Iterate over the lines in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.lines.iter()
    }

    /// Number of lines, blank negotiated entries included
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the set has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Name part of a `"Name: value"` line, trimmed. `None` when there is no colon.
pub fn header_name(line: &str) -> Option<&str> {
    line.split_once(':').map(|(name, _)| name.trim())
}
