//! Namespace listing command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, Namespace};
use crate::output::{format_timestamp, print_warning, OutputFormat};

/// Row for the namespaces table
#[derive(Tabled)]
struct NamespaceRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "First Seen")]
    created_at: String,
    #[tabled(rename = "Last Update")]
    updated_at: String,
}

/// List all monitored namespaces
pub async fn list_namespaces(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let namespaces: Vec<Namespace> = client.get("api/namespaces").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&namespaces)?);
        }
        OutputFormat::Table => {
            if namespaces.is_empty() {
                print_warning("No namespaces monitored");
                return Ok(());
            }

            let rows: Vec<NamespaceRow> = namespaces
                .iter()
                .map(|ns| NamespaceRow {
                    id: ns.id,
                    name: ns.name.clone(),
                    created_at: format_timestamp(&ns.created_at),
                    updated_at: format_timestamp(&ns.updated_at),
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
