//! Status command - check which services answer their index

use anyhow::{bail, Result};
use ladok_client::LadokApi;

use crate::output::{OutputContext, StatusRow};

/// Report whether each service answers its index request
pub async fn status(api: &dyn LadokApi, services: &[String], ctx: &OutputContext) -> Result<()> {
    let mut rows = Vec::with_capacity(services.len());
    let mut down = 0;
    for service in services {
        let up = api.status_for_service(service).await;
        if !up {
            down += 1;
        }
        rows.push(StatusRow {
            service: service.clone(),
            status: if up { "up" } else { "down" }.to_string(),
        });
    }

    ctx.print(&rows);
    if down > 0 {
        bail!("{} of {} services unavailable", down, services.len());
    }
    Ok(())
}
