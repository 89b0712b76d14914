//! Content negotiation
//!
//! Maps the symbolic content-type names accepted by the client
//! (`json`, `url`, `form-data`, `text`, `xml`) to concrete header text for
//! both the request (`Content-Type`) and response (`Accept`) roles.
//!
//! Lookup is lenient: an unrecognized symbol yields an empty header string
//! instead of an error.

use serde::{Deserialize, Serialize};

/// A recognized content-type symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "url")]
    UrlEncoded,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "xml")]
    Xml,
}

impl ContentType {
    /// Look up a symbol. Matching is exact (`"JSON"` is not recognized).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "json" => Some(Self::Json),
            "url" => Some(Self::UrlEncoded),
            "form-data" => Some(Self::FormData),
            "text" => Some(Self::Text),
            "xml" => Some(Self::Xml),
            _ => None,
        }
    }

    /// The symbol this content type is configured with
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::UrlEncoded => "url",
            Self::FormData => "form-data",
            Self::Text => "text",
            Self::Xml => "xml",
        }
    }

    /// MIME type carried in the headers
    pub fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::UrlEncoded => "application/x-www-form-urlencoded",
            Self::FormData => "multipart/form-data",
            Self::Text => "text/plain",
            Self::Xml => "application/xml",
        }
    }

    /// `Content-Type: <mime>` header line
    pub fn content_type_header(self) -> String {
        format!("Content-Type: {}", self.mime())
    }

    /// `Accept: <mime>` header line
    pub fn accept_header(self) -> String {
        format!("Accept: {}", self.mime())
    }
}

/// Negotiated request header for a content-type symbol, or `""` if the
/// symbol is not recognized.
pub fn content_type_header(symbol: &str) -> String {
    ContentType::from_symbol(symbol)
        .map(ContentType::content_type_header)
        .unwrap_or_default()
}

/// Negotiated accept header for a content-type symbol, or `""` if the
/// symbol is not recognized.
pub fn accept_header(symbol: &str) -> String {
    ContentType::from_symbol(symbol)
        .map(ContentType::accept_header)
        .unwrap_or_default()
}
