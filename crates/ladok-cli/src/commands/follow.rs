//! Follow command - call a link directly

use anyhow::{Context, Result};
use ladok_client::{FollowOptions, HttpMethod, LadokApi, Link};

use crate::output::OutputContext;

/// What to send when following a link
#[derive(Debug, Default)]
pub struct FollowArgs<'a> {
    pub queries: &'a [String],
    pub headers: &'a [String],
    pub body: Option<&'a str>,
}

/// Follow `link` and print the JSON response
pub async fn follow(
    api: &dyn LadokApi,
    link: &Link,
    args: FollowArgs<'_>,
    ctx: &OutputContext,
) -> Result<()> {
    let options = build_options(&args)?;
    let value = api.follow_link(link, options).await?;
    ctx.print_json(&value);
    Ok(())
}

/// Link for a raw URI; a relation of `self` negotiates from the URI
pub fn link_for(uri: &str, method: HttpMethod, rel: Option<&str>) -> Link {
    match rel {
        Some(rel) => Link::new(rel, method, uri),
        None => Link::self_link(method, uri),
    }
}

fn build_options(args: &FollowArgs<'_>) -> Result<FollowOptions> {
    let mut options = FollowOptions::new();
    for query in args.queries {
        let (key, value) = query
            .split_once('=')
            .with_context(|| format!("Query parameter must be key=value: {}", query))?;
        options = options.query(key, value);
    }
    for header in args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header must be Name: value: {}", header))?;
        options = options.try_header(name.trim(), value.trim())?;
    }
    if let Some(body) = args.body {
        options = options.body(serde_json::from_str(body).context("Body is not valid JSON")?);
    }
    Ok(options)
}
