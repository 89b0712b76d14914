//! CLI arguments and parsing

use crate::types::Method;
use clap::Parser;
use std::path::PathBuf;

/// Make an HTTP request with auth, content negotiation and rate limiting
#[derive(Parser, Debug)]
#[command(name = "reqkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: Method,

    /// Absolute request URL
    pub url: String,

    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Bearer token
    #[arg(long, conflicts_with_all = ["api_key", "basic"])]
    pub bearer: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, conflicts_with = "basic")]
    pub api_key: Option<String>,

    /// Basic credentials as user:password
    #[arg(long)]
    pub basic: Option<String>,

    /// Content type symbol: json, url, form-data, text, xml
    #[arg(long)]
    pub content_type: Option<String>,

    /// Accept symbol: json, url, form-data, text, xml
    #[arg(long)]
    pub accept: Option<String>,

    /// Send a Content-Length header
    #[arg(long)]
    pub length: bool,

    /// Extra header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Raw request body
    #[arg(short, long, conflicts_with_all = ["fields", "files"])]
    pub data: Option<String>,

    /// Body field as key=value (repeatable)
    #[arg(short = 'F', long = "field")]
    pub fields: Vec<String>,

    /// File upload as name=path (repeatable)
    #[arg(long = "file")]
    pub files: Vec<String>,

    /// Rate limit as <limit>/<seconds>
    #[arg(long)]
    pub rate_limit: Option<String>,

    /// Save the response as pretty JSON to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a redacted client snapshot to stderr
    #[arg(long)]
    pub debug: bool,

    /// How to print the response body
    #[arg(short, long, default_value = "raw")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Body as received
    Raw,
    /// Body as JSON text, non-JSON wrapped in {"data": ...}
    Json,
    /// Pretty-printed JSON
    Pretty,
}
