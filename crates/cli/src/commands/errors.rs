//! Error listing and resolution commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{AiStatusPatch, ApiClient, PatchResponse, PodError, RecentError};
use crate::output::{
    color_ai_status, color_priority, format_timestamp, print_success, print_warning,
    truncate_message, OutputFormat,
};

const MESSAGE_COLUMN_WIDTH: usize = 60;

/// Row for the per-pod errors table
#[derive(Tabled)]
struct PodErrorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    error_type: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "AI Status")]
    ai_status: String,
    #[tabled(rename = "When")]
    timestamp: String,
}

/// Row for the cross-namespace recent errors table
#[derive(Tabled)]
struct RecentErrorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Type")]
    error_type: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "AI Status")]
    ai_status: String,
}

/// List errors of one pod, newest first
pub async fn list_pod_errors(
    client: &ApiClient,
    pod_id: u64,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let errors: Vec<PodError> = client
        .get(&format!("api/pods/{pod_id}/errors?limit={limit}"))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&errors)?);
        }
        OutputFormat::Table => {
            if errors.is_empty() {
                print_warning("No errors recorded for this pod");
                return Ok(());
            }

            let rows: Vec<PodErrorRow> = errors
                .iter()
                .map(|e| PodErrorRow {
                    id: e.id,
                    priority: color_priority(&e.priority),
                    error_type: e.error_type.clone(),
                    message: truncate_message(&e.message, MESSAGE_COLUMN_WIDTH),
                    ai_status: color_ai_status(&e.ai_resolution_status),
                    timestamp: format_timestamp(&e.timestamp),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// List recent errors across all namespaces, by priority then recency
pub async fn list_recent_errors(
    client: &ApiClient,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let errors: Vec<RecentError> = client
        .get(&format!("api/errors/recent?limit={limit}"))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&errors)?);
        }
        OutputFormat::Table => {
            if errors.is_empty() {
                print_success("No recent errors");
                return Ok(());
            }

            let rows: Vec<RecentErrorRow> = errors
                .iter()
                .map(|e| RecentErrorRow {
                    id: e.id,
                    priority: color_priority(&e.priority),
                    namespace: e.namespace_name.clone(),
                    pod: e.pod_name.clone(),
                    error_type: e.error_type.clone(),
                    message: truncate_message(&e.message, MESSAGE_COLUMN_WIDTH),
                    ai_status: color_ai_status(&e.ai_resolution_status),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} errors", errors.len());
        }
    }

    Ok(())
}

/// Patch the AI resolution status of one error
pub async fn resolve_error(
    client: &ApiClient,
    error_id: u64,
    status: &str,
    steps: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let patch = AiStatusPatch {
        status: status.to_string(),
        steps: if steps.is_empty() {
            None
        } else {
            Some(serde_json::json!(steps))
        },
    };

    let response: PatchResponse = client
        .patch(&format!("api/errors/{error_id}/ai-status"), &patch)
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({"success": response.success}));
        }
        OutputFormat::Table => {
            print_success(&format!("Error {error_id} marked {status}"));
            if let Some(message) = response.message {
                println!("Message: {}", message);
            }
        }
    }

    Ok(())
}
