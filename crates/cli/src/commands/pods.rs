//! Pod listing command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, PodSummary};
use crate::output::{color_status, format_timestamp, print_warning, OutputFormat};

/// Row for the pods table
#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Pod")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Errors (1h)")]
    error_count: usize,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

/// List pods of a namespace with rolling error counts
pub async fn list_pods(client: &ApiClient, namespace_id: u64, format: OutputFormat) -> Result<()> {
    let pods: Vec<PodSummary> = client
        .get(&format!("api/namespaces/{namespace_id}/pods"))
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pods)?);
        }
        OutputFormat::Table => {
            if pods.is_empty() {
                print_warning("No pods in this namespace");
                return Ok(());
            }

            let rows: Vec<PodRow> = pods
                .iter()
                .map(|p| PodRow {
                    id: p.id,
                    name: p.name.clone(),
                    status: color_status(&p.status),
                    error_count: p.error_count,
                    last_check: format_timestamp(&p.last_check),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} pods", pods.len());
        }
    }

    Ok(())
}
