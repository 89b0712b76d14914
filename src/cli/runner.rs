//! CLI runner - executes a single request

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{Client, FilePart, RequestBody};
use crate::response::SaveOutcome;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the client, send the request and report the result
    pub fn run(&self) -> Result<()> {
        let mut client = self.build_client()?;
        let body = self.build_body()?;

        debug!("Sending {} {}", self.cli.method, self.cli.url);
        let result = client.request(self.cli.method, &self.cli.url, body).clone();
        info!(
            "{} {} -> {} (Content-Length: {})",
            self.cli.method,
            self.cli.url,
            result.status_code,
            result.content_length_display()
        );

        let view = client.response();
        match self.cli.format {
            OutputFormat::Raw => {
                if let Some(text) = view.text() {
                    println!("{text}");
                }
            }
            OutputFormat::Json => println!("{}", view.as_json_text()),
            OutputFormat::Pretty => {
                if let Some(pretty) = view.pretty_json() {
                    println!("{}", pretty?);
                }
            }
        }

        if let Some(path) = &self.cli.output {
            let outcome = view.save_file(path);
            eprintln!("{outcome}");
            if let SaveOutcome::Failed(message) = outcome {
                return Err(Error::Other(message));
            }
        }

        if self.cli.debug {
            eprintln!("{}", client.debug_snapshot());
        }

        match (result.failure, result.transport_error) {
            (Some(kind), Some(message)) => Err(Error::transport(format!("{kind:?}: {message}"))),
            (Some(kind), None) => Err(Error::transport(format!("{kind:?} failure"))),
            _ => Ok(()),
        }
    }

    fn build_client(&self) -> Result<Client> {
        let cli = &self.cli;
        let mut client = match &cli.config {
            Some(path) => ClientConfig::from_file(path)?.build()?,
            None => Client::new(),
        };

        let content_type = cli.content_type.as_deref().unwrap_or("json");
        let accept = cli.accept.as_deref().unwrap_or("json");

        if let Some(token) = &cli.bearer {
            client.bearer(cli.length, content_type, accept, token.as_str());
        } else if let Some(token) = &cli.api_key {
            client.key(cli.length, content_type, accept, token.as_str());
        } else if let Some(token) = &cli.basic {
            client.basic(cli.length, content_type, accept, token.as_str());
        } else if cli.content_type.is_some() || cli.accept.is_some() || cli.length {
            client.negotiate(cli.length, content_type, accept);
        }

        if !cli.headers.is_empty() {
            let headers = cli
                .headers
                .iter()
                .map(|line| parse_pair(line, ':', "header"))
                .collect::<Result<Vec<_>>>()?;
            client.custom_headers(headers);
        }

        if let Some(rate) = &cli.rate_limit {
            let (limit, window) = parse_rate_limit(rate)?;
            client.rate_limit(limit, window);
        }

        Ok(client)
    }

    fn build_body(&self) -> Result<RequestBody> {
        let cli = &self.cli;
        if let Some(data) = &cli.data {
            return Ok(RequestBody::Text(data.clone()));
        }
        if cli.fields.is_empty() && cli.files.is_empty() {
            return Ok(RequestBody::Empty);
        }

        let mut body = RequestBody::fields();
        for field in &cli.fields {
            let (name, value) = parse_pair(field, '=', "field")?;
            body = body.field(name, value);
        }
        for file in &cli.files {
            let (name, path) = parse_pair(file, '=', "file")?;
            let part = FilePart::from_path(&path)
                .with_context(|| format!("Failed to read file '{path}' for field '{name}'"))?;
            body = body.file(name, part);
        }
        Ok(body)
    }
}

/// Split `"name<sep>value"`, trimming both sides. The name must not be empty.
fn parse_pair(input: &str, sep: char, what: &str) -> Result<(String, String)> {
    match input.split_once(sep) {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::config(format!(
            "Invalid {what} '{input}': expected name{sep}value"
        ))),
    }
}

/// Parse `"<limit>/<seconds>"`
fn parse_rate_limit(input: &str) -> Result<(u32, u64)> {
    let invalid = || {
        Error::config(format!(
            "Invalid rate limit '{input}': expected <limit>/<seconds>"
        ))
    };
    let (limit, window) = input.split_once('/').ok_or_else(invalid)?;
    let limit = limit.trim().parse().map_err(|_| invalid())?;
    let window = window.trim().parse().map_err(|_| invalid())?;
    Ok((limit, window))
}
