//! Client configuration
//!
//! A [`ClientConfig`] describes a client in YAML (or JSON):
//!
//! ```yaml
//! auth:
//!   scheme: bearer
//!   token: "${API_TOKEN}"
//! content_type: json
//! accept: json
//! enable_length: true
//! rate_limit:
//!   limit: 10
//!   window_seconds: 60
//! headers:
//!   X-Trace-Id: abc
//! ```
//!
//! `${VAR}` in tokens and header values is replaced from the environment.

use crate::error::{Error, Result, ResultExt};
use crate::http::{Client, RateLimiterConfig, Transport};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Regex for matching environment references: ${NAME}
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

// ============================================================================
// Auth
// ============================================================================

/// Authentication section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AuthConfigDef {
    /// No auth header
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer { token: String },
    /// `X-API-Key: <token>`
    Key { token: String },
    /// `Authorization: Basic <base64(token)>`
    Basic { token: String },
}

// ============================================================================
// Client config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Authentication scheme
    #[serde(default)]
    pub auth: AuthConfigDef,

    /// Request content-type symbol (json, url, form-data, text, xml)
    #[serde(default)]
    pub content_type: Option<String>,

    /// Accept symbol (json, url, form-data, text, xml)
    #[serde(default)]
    pub accept: Option<String>,

    /// Add `Content-Length` to requests
    #[serde(default)]
    pub enable_length: bool,

    /// Request-rate ceiling
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers appended after the auth headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Parse from a YAML (or JSON) string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Apply this configuration to a client: auth headers first, then custom
    /// headers, then the rate limit.
    pub fn apply(&self, client: &mut Client) -> Result<()> {
        let content_type = self.content_type.as_deref().unwrap_or_default();
        let accept = self.accept.as_deref().unwrap_or_default();
        let length = self.enable_length;

        match &self.auth {
            AuthConfigDef::Bearer { token } => {
                client.bearer(length, content_type, accept, expand_env(token)?);
            }
            AuthConfigDef::Key { token } => {
                client.key(length, content_type, accept, expand_env(token)?);
            }
            AuthConfigDef::Basic { token } => {
                client.basic(length, content_type, accept, expand_env(token)?);
            }
            AuthConfigDef::None => {
                if self.content_type.is_some() || self.accept.is_some() || length {
                    client.negotiate(length, content_type, accept);
                }
            }
        }

        if !self.headers.is_empty() {
            let headers = self
                .headers
                .iter()
                .map(|(name, value)| Ok((name.clone(), expand_env(value)?)))
                .collect::<Result<Vec<_>>>()?;
            client.custom_headers(headers);
        }

        if let Some(limit) = &self.rate_limit {
            client.rate_limit(limit.limit, limit.window_seconds);
        }

        Ok(())
    }

    /// Build a client over the default transport
    pub fn build(&self) -> Result<Client> {
        let mut client = Client::new();
        self.apply(&mut client)?;
        Ok(client)
    }

    /// Build a client over a custom transport
    pub fn build_with_transport(&self, transport: impl Transport + 'static) -> Result<Client> {
        let mut client = Client::with_transport(transport);
        self.apply(&mut client)?;
        Ok(client)
    }
}

/// Replace every `${NAME}` with the environment variable `NAME`.
pub fn expand_env(value: &str) -> Result<String> {
    let mut missing = None;
    let expanded = ENV_REGEX.replace_all(value, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        std::env::var(name).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| name.to_string());
            String::new()
        })
    });

    match missing {
        Some(name) => Err(Error::config(format!(
            "Environment variable '{name}' is not set"
        ))),
        None => Ok(expanded.into_owned()),
    }
}
