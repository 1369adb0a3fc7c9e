//! Pod Monitor CLI
//!
//! A command-line tool for inspecting monitored namespaces, pods, and
//! errors through the agent's read API.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{errors, namespaces, pods, stats};

/// Pod Monitor CLI
#[derive(Parser)]
#[command(name = "podmon")]
#[command(author, version, about = "CLI for the Pod Monitor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (falls back to PODMON_API_URL, then the config file)
    #[arg(long, env = "PODMON_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show dashboard statistics
    Stats,

    /// List monitored namespaces
    Namespaces,

    /// List pods of a namespace with their rolling error counts
    Pods {
        /// Namespace id (see `podmon namespaces`)
        namespace_id: u64,
    },

    /// List errors
    #[command(subcommand)]
    Errors(ErrorsCommands),

    /// Update the AI resolution status of an error
    Resolve {
        /// Error id to update
        error_id: u64,

        /// New status (not_started, analyzing, resolving, resolved, manual_required)
        status: String,

        /// Resolution step note (repeatable)
        #[arg(long)]
        step: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ErrorsCommands {
    /// Errors of one pod, newest first
    Pod {
        /// Pod id (see `podmon pods`)
        pod_id: u64,

        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Most recent errors across all namespaces, by priority
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let api_url = config::resolve_api_url(cli.api_url.as_deref());
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Stats => {
            stats::show_stats(&client, cli.format).await?;
        }
        Commands::Namespaces => {
            namespaces::list_namespaces(&client, cli.format).await?;
        }
        Commands::Pods { namespace_id } => {
            pods::list_pods(&client, namespace_id, cli.format).await?;
        }
        Commands::Errors(errors_cmd) => match errors_cmd {
            ErrorsCommands::Pod { pod_id, limit } => {
                errors::list_pod_errors(&client, pod_id, limit, cli.format).await?;
            }
            ErrorsCommands::Recent { limit } => {
                errors::list_recent_errors(&client, limit, cli.format).await?;
            }
        },
        Commands::Resolve {
            error_id,
            status,
            step,
        } => {
            errors::resolve_error(&client, error_id, &status, step, cli.format).await?;
        }
    }

    Ok(())
}
