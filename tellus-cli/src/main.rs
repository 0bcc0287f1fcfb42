//! Tellus CLI - run geoscientific tools from the command line

mod demo;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tellus_core::prelude::*;

#[derive(Parser)]
#[command(name = "tellus")]
#[command(about = "Tellus geoscientific tool runtime CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (otherwise tellus.toml and TELLUS_* env vars)
    #[arg(short, long, env = "TELLUS_CONFIG_PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the search paths and report every library candidate
    Init,
    /// List loaded libraries, or the tools of one library
    List {
        /// Library identifier
        library: Option<String>,
    },
    /// Show a tool's metadata and parameters
    Describe {
        /// Library identifier
        library: String,
        /// Tool identifier
        tool: String,
    },
    /// Execute a tool
    Run {
        /// Library identifier
        library: String,
        /// Tool identifier
        tool: String,
        /// Parameter values as key=value pairs (values parsed as JSON,
        /// falling back to plain strings)
        #[arg(value_name = "KEY=VALUE")]
        values: Vec<String>,
    },
    /// Version and load summary
    Version,
}

/// Prints runtime messages straight to the terminal.
struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn message(&self, text: &str) {
        println!("{text}");
    }

    fn warning(&self, text: &str) {
        eprintln!("warning: {text}");
    }

    fn error(&self, text: &str) {
        eprintln!("error: {text}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TellusConfig::from_file(path)
            .with_context(|| format!("reading configuration from {path}"))?,
        None => TellusConfig::load().context("loading configuration")?,
    };

    let loader = demo::loader();
    let sink: SharedSink = Arc::new(ConsoleSink);
    let (env, report) = Environment::initialize_with_sink(config, &loader, sink)
        .await
        .context("initializing environment")?;
    env.register(demo::library()).await;

    match cli.command {
        Commands::Init => {
            for line in report.summary_lines() {
                println!("{line}");
            }
            for warning in report.warnings() {
                eprintln!("warning: {warning}");
            }
            env.report_version().await;
        }
        Commands::List { library } => match library {
            None => {
                for lib in env.manager().list_libraries().await {
                    println!(
                        "{:<20} {:<8} {:>3} tools  {}",
                        lib.id(),
                        lib.version(),
                        lib.tool_count(),
                        lib.name()
                    );
                }
            }
            Some(id) => {
                let Some(tools) = env.manager().list_tools(&id).await else {
                    bail!("library not found: {id}");
                };
                for info in tools {
                    println!("{:<20} {}", info.id, info.name);
                }
            }
        },
        Commands::Describe { library, tool } => {
            let Some(tool_impl) = env.manager().find(&library, &tool).await else {
                bail!("tool not found: {library}.{tool}");
            };
            let info = tool_impl.info();
            println!("{} ({}.{})", info.name, library, info.id);
            if !info.description.is_empty() {
                println!("  {}", info.description);
            }
            if let Some(category) = &info.category {
                println!("  category: {category}");
            }
            println!();
            for param in tool_impl.parameters().iter() {
                let required = if param.required { "required" } else { "optional" };
                println!(
                    "  {:<16} {:<10} {:<8} {}",
                    param.id,
                    param.kind.type_name(),
                    required,
                    param.label
                );
            }
        }
        Commands::Run {
            library,
            tool,
            values,
        } => {
            let values = parse_values(&values)?;
            let outcome = env
                .execute(&library, &tool, values, RunOptions::default())
                .await;
            match &outcome.status {
                ExecutionStatus::Succeeded => {
                    println!(
                        "succeeded in {:.3}s",
                        outcome.elapsed.as_secs_f64()
                    );
                    for id in &outcome.outputs {
                        if let Some(object) = env.store().get(*id) {
                            let object = object
                                .lock()
                                .unwrap_or_else(std::sync::PoisonError::into_inner);
                            println!(
                                "  {} {} ({})",
                                object.kind().as_str(),
                                object.name().unwrap_or("<unnamed>"),
                                id
                            );
                        }
                    }
                }
                ExecutionStatus::InvalidParameters { report } => {
                    for issue in report.issues() {
                        eprintln!("  {}: {}", issue.parameter, issue.message);
                    }
                    bail!("invalid parameters for {library}.{tool}");
                }
                ExecutionStatus::Failed { message } => bail!("{library}.{tool}: {message}"),
                ExecutionStatus::Cancelled => bail!("{library}.{tool}: cancelled"),
                ExecutionStatus::NotFound { .. } => bail!("tool not found: {library}.{tool}"),
                ExecutionStatus::Busy => bail!("{library}.{tool} is already executing"),
                ExecutionStatus::ObjectBusy { object } => {
                    bail!("output object {object} is in use")
                }
            }
        }
        Commands::Version => {
            env.report_version().await;
        }
    }

    Ok(())
}

/// Parse `key=value` pairs. Values that read as JSON keep their type;
/// anything else becomes a string.
fn parse_values(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut values = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got '{pair}'");
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        values.insert(key.to_string(), value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_json_with_string_fallback() {
        let values = parse_values(&[
            "cells=32".to_string(),
            "value=1.5".to_string(),
            "name=elevation".to_string(),
            "flag=true".to_string(),
        ])
        .unwrap();

        assert_eq!(values["cells"], serde_json::json!(32));
        assert_eq!(values["value"], serde_json::json!(1.5));
        assert_eq!(values["name"], serde_json::json!("elevation"));
        assert_eq!(values["flag"], serde_json::json!(true));
    }

    #[test]
    fn malformed_pair_is_rejected() {
        assert!(parse_values(&["no-equals".to_string()]).is_err());
    }
}
