//! Links command - list a service's index

use anyhow::Result;
use ladok_client::LadokClient;

use crate::output::{LinkRow, OutputContext};

/// List the links a service publishes
pub async fn links(client: &LadokClient, service: &str, ctx: &OutputContext) -> Result<()> {
    let links = client.index().links_for(service).await?;
    let rows: Vec<LinkRow> = links.iter().map(LinkRow::from).collect();
    ctx.print(&rows);
    Ok(())
}
