//! gql-authz
//!
//! Checks an authorization configuration, or shows how a query is redacted
//! for a given set of scopes.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gql_authz::{
    AuthzEnforcer, EnforcerOptions, ExecutionRequest, Schema,
    access_control::{AuthorizationIndex, ScopeSet},
    config::{AuthzConfig, LogFormat, load_config},
    enforcement::{StaticScopeProvider, TracingListener},
};
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// GraphQL field authorization - redact queries by client scopes
#[derive(Parser, Debug)]
#[command(name = "gql-authz")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "GQL_AUTHZ_CONFIG")]
    config: Option<String>,

    /// Path to the GraphQL schema (overrides `schema` in the configuration)
    #[arg(short, long, env = "GQL_AUTHZ_SCHEMA")]
    schema: Option<String>,

    /// Caller scope; repeat for several
    #[arg(long = "scope")]
    scopes: Vec<String>,

    /// File holding the query to redact (stdin when omitted)
    #[arg(short, long)]
    query: Option<String>,

    /// Operation to execute when the query holds several
    #[arg(long)]
    operation_name: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Only load and compile the configuration
    #[arg(long)]
    check: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GQL_AUTHZ_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(args: &Args, config: &AuthzConfig) {
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn read_query(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file '{}'", path)),
        None => {
            let mut query = String::new();
            std::io::stdin()
                .read_to_string(&mut query)
                .context("Failed to read query from stdin")?;
            Ok(query)
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())?;

    // Initialize logging
    init_logging(&args, &config);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting gql-authz");

    // Load schema
    let schema_path = args
        .schema
        .as_deref()
        .or(config.schema.as_deref())
        .context("No schema given; pass --schema or set `schema` in the configuration")?;
    let schema = Arc::new(
        Schema::load(schema_path)
            .inspect_err(|e| error!(error = %e, path = schema_path, "Failed to load schema"))?,
    );

    if args.check {
        let index = AuthorizationIndex::build(Arc::clone(&schema), &config.clients)
            .inspect_err(|e| error!(error = %e, "Invalid authorization rules"))?;
        for client in index.client_ids() {
            let Some(permissions) = index.permissions(client) else {
                continue;
            };
            println!("{}: {} field rules", client, permissions.rule_count());
            for rule in permissions.rules() {
                println!("  {}", rule);
            }
        }
        println!("Configuration OK ({} clients)", index.len());
        return Ok(());
    }

    // Redact the query for the given scopes
    let scopes: ScopeSet = args.scopes.iter().map(String::as_str).collect();
    let enforcer = AuthzEnforcer::new(
        &config,
        schema,
        Arc::new(StaticScopeProvider::new(scopes)),
        EnforcerOptions::default().with_listener(TracingListener),
    )
    .inspect_err(|e| error!(error = %e, "Failed to create enforcer"))?;

    let mut request = ExecutionRequest::new(read_query(args.query.as_deref())?);
    request.operation_name = args.operation_name.clone();

    let mut state = enforcer.create_state(&request);
    let enforced = enforcer
        .enforce(&mut state, &request)
        .inspect_err(|e| error!(error = %e, "Failed to redact query"))?;

    match args.output {
        OutputFormat::Text => {
            print!("{}", enforced.document);
            if !state.denials().is_empty() {
                println!();
                println!("Denied fields:");
                for denial in state.denials() {
                    println!("  - {}", denial);
                }
            }
        }
        OutputFormat::Json => {
            let errors: Vec<_> = state
                .denials()
                .iter()
                .map(|d| d.to_graphql_error())
                .collect();
            let output = json!({
                "query": enforced.document.to_string(),
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
