//! CLI module
//!
//! Command-line interface for making a single request with a configured
//! client and printing, saving or inspecting the result.

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat};
pub use runner::Runner;
