//! Dashboard statistics command

use anyhow::Result;

use crate::client::{ApiClient, DashboardStats};
use crate::output::OutputFormat;

/// Show dashboard headline counts
pub async fn show_stats(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let stats: DashboardStats = client.get("api/stats").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Table => {
            println!("Namespaces:   {}", stats.total_namespaces);
            println!("Pods:         {}", stats.total_pods);
            println!("  running:    {}", stats.running_pods);
            println!("  erroring:   {}", stats.error_pods);
            println!("Errors today: {}", stats.errors_today);
        }
    }

    Ok(())
}
