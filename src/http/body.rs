//! Request bodies and per-request encoding
//!
//! The encoding of a request is decided once, from the active header lines and
//! from whether the body carries a file payload:
//!
//! 1. A file payload disables every conversion; the body goes out as a
//!    multipart form.
//! 2. Otherwise a structured body is URL-encoded if the headers declare
//!    `application/x-www-form-urlencoded`, else JSON-encoded if they declare
//!    `application/json`. URL encoding wins when both are declared.
//! 3. If the headers declare `application/xml`, the body must be text that
//!    starts with an XML declaration.

use super::transport::TransportBody;
use crate::auth::HeaderSet;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use url::form_urlencoded;

const URL_ENCODED_MIME: &str = "application/x-www-form-urlencoded";
const JSON_MIME: &str = "application/json";
const XML_MIME: &str = "application/xml";

// ============================================================================
// Body types
// ============================================================================

/// Raw file content sent as one part of a multipart form
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name reported in the part's disposition
    pub file_name: String,
    /// Part MIME type; the transport picks a default when absent
    pub mime_type: Option<String>,
    /// File bytes
    pub content: Vec<u8>,
}

impl FilePart {
    /// Create a file part from in-memory bytes
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    /// Set the part MIME type
    #[must_use]
    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk; the part is named after the file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        Ok(Self::new(file_name, content))
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.content.len())
            .finish()
    }
}

/// One value of a structured body
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    /// Plain JSON value
    Json(JsonValue),
    /// File upload
    File(FilePart),
}

impl From<JsonValue> for BodyValue {
    fn from(value: JsonValue) -> Self {
        BodyValue::Json(value)
    }
}

impl From<FilePart> for BodyValue {
    fn from(part: FilePart) -> Self {
        BodyValue::File(part)
    }
}

/// Body handed to the client for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// Text sent as-is
    Text(String),
    /// Structured mapping, in insertion order
    Fields(Vec<(String, BodyValue)>),
}

impl RequestBody {
    /// Start an empty structured body
    pub fn fields() -> Self {
        RequestBody::Fields(Vec::new())
    }

    /// Add a JSON field. Turns a non-structured body into a structured one.
    #[must_use]
    pub fn field(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.push(name.into(), BodyValue::Json(value.into()))
    }

    /// Add a file field. Turns a non-structured body into a structured one.
    #[must_use]
    pub fn file(self, name: impl Into<String>, part: FilePart) -> Self {
        self.push(name.into(), BodyValue::File(part))
    }

    fn push(self, name: String, value: BodyValue) -> Self {
        let mut fields = match self {
            RequestBody::Fields(fields) => fields,
            RequestBody::Empty | RequestBody::Text(_) => Vec::new(),
        };
        fields.push((name, value));
        RequestBody::Fields(fields)
    }

    /// Whether any field is a file upload
    pub fn has_file(&self) -> bool {
        match self {
            RequestBody::Fields(fields) => fields
                .iter()
                .any(|(_, value)| matches!(value, BodyValue::File(_))),
            RequestBody::Empty | RequestBody::Text(_) => false,
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<JsonObject> for RequestBody {
    fn from(map: JsonObject) -> Self {
        RequestBody::Fields(
            map.into_iter()
                .map(|(key, value)| (key, BodyValue::Json(value)))
                .collect(),
        )
    }
}

/// Objects become structured bodies, `null` becomes empty, anything else is
/// sent as its JSON text.
///
/// Only objects take part in URL or JSON encoding. An array is already text
/// by the time the encoding is chosen, so `["a","b"]` goes out verbatim even
/// when the headers declare `application/x-www-form-urlencoded`.
impl From<JsonValue> for RequestBody {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => map.into(),
            JsonValue::Null => RequestBody::Empty,
            JsonValue::String(text) => RequestBody::Text(text),
            other => RequestBody::Text(other.to_string()),
        }
    }
}

impl From<Option<RequestBody>> for RequestBody {
    fn from(body: Option<RequestBody>) -> Self {
        body.unwrap_or_default()
    }
}

// ============================================================================
// Encoding decision
// ============================================================================

/// Encoding the executor applied to the last request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Sent as-is
    Raw,
    /// `key=value&...`
    UrlEncoded,
    /// Compact JSON text
    Json,
    /// Validated XML text
    Xml,
    /// Multipart form built by the transport
    Multipart,
}

/// Content categories declared by the header lines.
///
/// Several may be set at once; each is a plain substring match over every
/// header line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingFlags {
    pub url_encoded: bool,
    pub json: bool,
    pub xml: bool,
}

impl EncodingFlags {
    /// Scan the header lines once
    pub fn from_headers(headers: &HeaderSet) -> Self {
        Self {
            url_encoded: headers.contains_text(URL_ENCODED_MIME),
            json: headers.contains_text(JSON_MIME),
            xml: headers.contains_text(XML_MIME),
        }
    }
}

/// Body ready for the transport, with the encoding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub encoding: BodyEncoding,
    pub body: TransportBody,
}

/// Apply the encoding rules to a body.
///
/// Fails with [`Error::InvalidXmlBody`] when XML is declared and the final
/// body is not text starting with `<?xml` (any case).
pub fn encode_body(body: RequestBody, flags: EncodingFlags) -> Result<EncodedBody> {
    let has_file = body.has_file();
    let mut encoding = BodyEncoding::Raw;

    let body = match body {
        RequestBody::Fields(fields) if !has_file && flags.url_encoded => {
            encoding = BodyEncoding::UrlEncoded;
            RequestBody::Text(url_encode(&fields))
        }
        RequestBody::Fields(fields) if !has_file && flags.json => {
            encoding = BodyEncoding::Json;
            RequestBody::Text(json_encode(fields)?)
        }
        other => other,
    };

    if flags.xml {
        match &body {
            RequestBody::Text(text) if has_xml_declaration(text) => {
                if encoding == BodyEncoding::Raw {
                    encoding = BodyEncoding::Xml;
                }
            }
            _ => return Err(Error::InvalidXmlBody),
        }
    }

    let body = match body {
        RequestBody::Empty => TransportBody::Empty,
        RequestBody::Text(text) => TransportBody::Bytes(text.into_bytes()),
        RequestBody::Fields(fields) => {
            encoding = BodyEncoding::Multipart;
            TransportBody::Form(fields)
        }
    };

    Ok(EncodedBody { encoding, body })
}

/// Whether text starts with an XML declaration, ignoring case
pub fn has_xml_declaration(text: &str) -> bool {
    text.get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<?xml"))
}

/// Form-encode a structured body. Nested values flatten to bracketed keys,
/// `null` values are left out and file fields are ignored.
pub fn url_encode(fields: &[(String, BodyValue)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        if let BodyValue::Json(value) = value {
            append_flattened(&mut serializer, key, value);
        }
    }
    serializer.finish()
}

fn append_flattened(
    serializer: &mut form_urlencoded::Serializer<'_, String>,
    key: &str,
    value: &JsonValue,
) {
    match value {
        JsonValue::Null => {}
        JsonValue::Bool(flag) => {
            serializer.append_pair(key, if *flag { "true" } else { "false" });
        }
        JsonValue::Number(number) => {
            serializer.append_pair(key, &number.to_string());
        }
        JsonValue::String(text) => {
            serializer.append_pair(key, text);
        }
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_flattened(serializer, &format!("{key}[{index}]"), item);
            }
        }
        JsonValue::Object(map) => {
            for (name, item) in map {
                append_flattened(serializer, &format!("{key}[{name}]"), item);
            }
        }
    }
}

/// Compact JSON for a structured body. Later duplicates of a key win.
pub fn json_encode(fields: Vec<(String, BodyValue)>) -> Result<String> {
    let map: JsonObject = fields
        .into_iter()
        .filter_map(|(key, value)| match value {
            BodyValue::Json(value) => Some((key, value)),
            BodyValue::File(_) => None,
        })
        .collect();
    serde_json::to_string(&JsonValue::Object(map)).map_err(|e| Error::encoding(e.to_string()))
}
