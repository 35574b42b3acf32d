//! List command - prints stored access keys as JSON

use tracing::info;

use crate::config::AppConfig;
use crate::domain::access_key::ServerId;

use super::AccessKeyView;

/// Print access keys, optionally only those of one server
pub async fn run(config: &AppConfig, server: Option<i64>) -> anyhow::Result<()> {
    let service = crate::create_service_with_config(config).await?;

    let keys = service.list(server.map(ServerId::new)).await?;
    info!(count = keys.len(), "Listed access keys");

    let views: Vec<AccessKeyView> = keys.iter().map(AccessKeyView::from).collect();
    println!("{}", serde_json::to_string_pretty(&views)?);

    Ok(())
}
