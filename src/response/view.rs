//! Structured views over the last response body

use crate::http::RequestResult;
use crate::types::{JsonObject, JsonValue};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of [`ResponseView::save_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written successfully
    Saved { path: PathBuf, bytes: usize },
    /// No response body was stored
    NothingToSave,
    /// Serialization or write failure
    Failed(String),
}

impl SaveOutcome {
    /// Whether the file was written
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Saved { path, bytes } => {
                write!(f, "Response saved to {} ({bytes} bytes)", path.display())
            }
            SaveOutcome::NothingToSave => f.write_str("No response to save"),
            SaveOutcome::Failed(message) => write!(f, "Failed to save response: {message}"),
        }
    }
}

/// Borrowed view over the last [`RequestResult`]
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    result: Option<&'a RequestResult>,
}

impl<'a> ResponseView<'a> {
    /// Create a view; `None` means no request has been made
    pub fn new(result: Option<&'a RequestResult>) -> Self {
        Self { result }
    }

    /// Raw body bytes
    pub fn body(&self) -> Option<&'a [u8]> {
        self.result.and_then(|r| r.body.as_deref())
    }

    /// Body as text, invalid UTF-8 replaced
    pub fn text(&self) -> Option<String> {
        self.body()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Status code of the last request
    pub fn status_code(&self) -> Option<u16> {
        self.result.map(|r| r.status_code)
    }

    fn decode(&self) -> Option<JsonValue> {
        serde_json::from_slice(self.body()?).ok()
    }

    /// Decoded JSON object or array; an empty object for anything else.
    pub fn as_map(&self) -> JsonValue {
        match self.decode() {
            Some(value @ (JsonValue::Object(_) | JsonValue::Array(_))) => value,
            _ => JsonValue::Object(JsonObject::new()),
        }
    }

    /// Decoded JSON, only when it is an object.
    pub fn as_object(&self) -> Option<JsonValue> {
        self.decode().filter(JsonValue::is_object)
    }

    /// Decode into a caller type
    pub fn as_typed<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(self.body()?).ok()
    }

    /// JSON text of the body: verbatim when it already is JSON, otherwise
    /// wrapped as `{"data": <text>}`.
    pub fn as_json_text(&self) -> String {
        match self.body() {
            Some(bytes) if serde_json::from_slice::<IgnoredAny>(bytes).is_ok() => {
                String::from_utf8_lossy(bytes).into_owned()
            }
            Some(bytes) => json!({ "data": String::from_utf8_lossy(bytes) }).to_string(),
            None => json!({ "data": null }).to_string(),
        }
    }

    /// Pretty JSON for the file: the decoded body, or the raw text wrapped as
    /// `{"data": <text>}`.
    pub fn pretty_json(&self) -> Option<Result<String, serde_json::Error>> {
        let bytes = self.body()?;
        let value = serde_json::from_slice::<JsonValue>(bytes)
            .unwrap_or_else(|_| json!({ "data": String::from_utf8_lossy(bytes) }));
        Some(serde_json::to_string_pretty(&value))
    }

    /// Write the body to `path` as pretty JSON.
    pub fn save_file(&self, path: impl AsRef<Path>) -> SaveOutcome {
        let path = path.as_ref();
        let contents = match self.pretty_json() {
            None => return SaveOutcome::NothingToSave,
            Some(Ok(contents)) => contents,
            Some(Err(e)) => return SaveOutcome::Failed(e.to_string()),
        };

        match std::fs::write(path, &contents) {
            Ok(()) => {
                debug!("Saved response to {}", path.display());
                SaveOutcome::Saved {
                    path: path.to_path_buf(),
                    bytes: contents.len(),
                }
            }
            Err(e) => {
                warn!("Failed to save response to {}: {}", path.display(), e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }
}
