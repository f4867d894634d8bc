//! Find command - resolve a relation to a link

use anyhow::Result;
use ladok_client::{HttpMethod, LadokApi};

use crate::output::{LinkRow, OutputContext};

/// Resolve a relation through its service index
pub async fn find(
    api: &dyn LadokApi,
    rel: &str,
    method: HttpMethod,
    ctx: &OutputContext,
) -> Result<()> {
    let link = api.find_index_link(rel, method).await?;
    ctx.print(&[LinkRow::from(&link)]);
    Ok(())
}
