//! Redacted diagnostics
//!
//! [`DebugSnapshot`] is a read-only copy of the client state and last result,
//! safe to print or log: credential headers keep their name but lose their
//! value.

use crate::http::BodyEncoding;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Marker that replaces sensitive header values
pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_HEADERS: [&str; 2] = ["authorization", "x-api-key"];

/// Redact one `"Name: value"` line if its name is a credential header.
pub fn redact_header(line: &str) -> String {
    for name in SENSITIVE_HEADERS {
        let prefix_len = name.len() + 1;
        let is_sensitive = line
            .get(..prefix_len)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&format!("{name}:")));
        if is_sensitive {
            return format!("{}: {REDACTED}", &line[..name.len()]);
        }
    }
    line.to_string()
}

/// Redact every line
pub fn redact_headers(lines: &[String]) -> Vec<String> {
    lines.iter().map(|line| redact_header(line)).collect()
}

/// Snapshot of a client for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub url: Option<String>,
    pub tls_verified: bool,
    pub status_code: Option<u16>,
    pub transport_error: Option<String>,
    /// Header lines with credentials redacted
    pub headers: Vec<String>,
    /// Length sent with the last request, or `"N/A"`
    pub content_length: String,
    pub request_count: u64,
    pub auth_scheme: &'static str,
    pub encoding: Option<BodyEncoding>,
    pub created_at: DateTime<Utc>,
    /// Time since the client was created
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL:             {}", self.url.as_deref().unwrap_or("-"))?;
        writeln!(f, "TLS verified:    {}", self.tls_verified)?;
        match self.status_code {
            Some(status) => writeln!(f, "Status:          {status}")?,
            None => writeln!(f, "Status:          -")?,
        }
        writeln!(
            f,
            "Transport error: {}",
            self.transport_error.as_deref().unwrap_or("none")
        )?;
        writeln!(f, "Content-Length:  {}", self.content_length)?;
        writeln!(f, "Requests:        {}", self.request_count)?;
        writeln!(f, "Auth scheme:     {}", self.auth_scheme)?;
        writeln!(f, "Created at:      {}", self.created_at.to_rfc3339())?;
        writeln!(f, "Elapsed:         {:.3}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "Headers:")?;
        for line in &self.headers {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
