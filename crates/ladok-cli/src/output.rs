//! Output formatting for ladok-cli (table, json)

use clap::ValueEnum;
use colored::Colorize;
use ladok_client::Link;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    println!("{}", Table::new(data));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
        }
    }

    /// Print a JSON document as returned by the API
    pub fn print_json(&self, value: &serde_json::Value) {
        let rendered = match self.format {
            OutputFormat::Table => serde_json::to_string_pretty(value),
            OutputFormat::Json => serde_json::to_string(value),
        };
        println!("{}", rendered.unwrap_or_else(|_| "null".to_string()));
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Link display for links and find commands
#[derive(Debug, Tabled, Serialize)]
pub struct LinkRow {
    #[tabled(rename = "Method")]
    pub method: String,
    #[tabled(rename = "Rel")]
    pub rel: String,
    #[tabled(rename = "URI")]
    pub uri: String,
}

impl From<&Link> for LinkRow {
    fn from(link: &Link) -> Self {
        Self {
            method: link.method.to_string(),
            rel: link.rel.clone(),
            uri: link.uri.clone(),
        }
    }
}

/// Service availability for status command
#[derive(Debug, Tabled, Serialize)]
pub struct StatusRow {
    #[tabled(rename = "Service")]
    pub service: String,
    #[tabled(rename = "Status")]
    pub status: String,
}
