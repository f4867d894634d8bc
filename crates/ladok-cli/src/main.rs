//! Ladok CLI - explore and follow hypermedia API links
//!
//! Resolves relations through service indexes, checks service availability
//! and calls links directly, printing the JSON they return.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ladok_client::{HttpMethod, LadokClient};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::follow::{link_for, FollowArgs};
use crate::config::{ArgOverrides, Config};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "ladok-cli")]
#[command(author, version, about = "Hypermedia API link explorer")]
#[command(propagate_version = true)]
struct Cli {
    /// API root URL
    #[arg(short, long, env = "LADOK_BASE_URL")]
    base_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "LADOK_CONFIG")]
    config: Option<PathBuf>,

    /// PKCS#12 client certificate
    #[arg(long, env = "LADOK_CERT")]
    cert: Option<PathBuf>,

    /// Certificate passphrase
    #[arg(long, env = "LADOK_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether services answer their index
    Status {
        /// Service names, e.g. resultat
        #[arg(required = true)]
        services: Vec<String>,
    },

    /// List the links a service publishes
    Links {
        /// Service name
        service: String,
    },

    /// Resolve a relation to a link
    Find {
        /// Relation URI
        rel: String,

        /// HTTP method of the link
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: HttpMethod,
    },

    /// Follow a link and print the response
    Follow {
        /// Link URI
        uri: String,

        /// HTTP method of the link
        #[arg(short, long, default_value = "GET", value_parser = parse_method)]
        method: HttpMethod,

        /// Relation of the link (defaults to self)
        #[arg(long)]
        rel: Option<String>,

        /// Query parameter as key=value (repeatable)
        #[arg(long = "query", value_name = "KEY=VALUE")]
        queries: Vec<String>,

        /// Extra header as "Name: value" (repeatable)
        #[arg(long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,

        /// JSON body for POST and PUT
        #[arg(long)]
        body: Option<String>,
    },
}

/// Parse a method name, case-insensitively, rejecting unsupported ones
fn parse_method(value: &str) -> Result<HttpMethod, String> {
    match value.parse::<HttpMethod>() {
        Ok(HttpMethod::Other(method)) => Err(format!(
            "unsupported method {} (expected GET, POST, PUT or DELETE)",
            method
        )),
        Ok(method) => Ok(method),
        Err(never) => match never {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        base_url: cli.base_url.as_deref(),
        cert: cli.cert.as_deref(),
        passphrase: cli.passphrase.as_deref(),
        output: cli.output.map(|format| format.as_str()),
        no_color: cli.no_color,
    });
    let format = match merged.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    debug!("Using API root {}", merged.client.connection.base_url);
    let client = LadokClient::from_config(&merged.client).context("Failed to create client")?;

    let result = match &cli.command {
        Commands::Status { services } => commands::status(&client, services, &ctx).await,

        Commands::Links { service } => commands::links(&client, service, &ctx).await,

        Commands::Find { rel, method } => {
            commands::find(&client, rel, method.clone(), &ctx).await
        }

        Commands::Follow {
            uri,
            method,
            rel,
            queries,
            headers,
            body,
        } => {
            let link = link_for(uri, method.clone(), rel.as_deref());
            let args = FollowArgs {
                queries,
                headers,
                body: body.as_deref(),
            };
            commands::follow(&client, &link, args, &ctx).await
        }
    };

    match result {
        Ok(()) => {
            if matches!(cli.command, Commands::Status { .. }) {
                ctx.success("All services available");
            }
            Ok(())
        }
        Err(err) => {
            ctx.error(&format!("Error: {:#}", err));
            std::process::exit(1);
        }
    }
}
