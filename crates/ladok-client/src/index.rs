//! Service index cache
//!
//! Each service publishes its links at `{base}/{service}/service/index`.
//! The first lookup for a service fetches that document; the link collection
//! is then kept for the lifetime of the cache. Entries are never refreshed or
//! evicted. Concurrent first lookups for the same service share one fetch; a
//! failed fetch leaves no entry behind.

use std::collections::HashMap;
use std::sync::Arc;

use ladok_core::{ApiError, HttpMethod, Link, ServiceIndex};
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::client::decode_response;
use crate::error::{LadokClientError, Result};
use crate::options::{OptionsFactory, TransportOverrides};
use crate::transport::Transport;

type Slot = Arc<OnceCell<Arc<[Link]>>>;

/// Per-service cache of index links
pub struct LinkIndex {
    base_url: String,
    transport: Arc<dyn Transport>,
    options: OptionsFactory,
    entries: Mutex<HashMap<String, Slot>>,
}

impl LinkIndex {
    /// `base_url` must not end with `/`
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        options: OptionsFactory,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            options,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// URL of a service's index document
    pub fn index_url(&self, service: &str) -> String {
        format!("{}/{}/service/index", self.base_url, service)
    }

    /// Links published by a service, fetched on first use
    #[instrument(skip(self))]
    pub async fn links_for(&self, service: &str) -> Result<Arc<[Link]>> {
        if service.is_empty() {
            return Err(ApiError::missing_argument("service").into());
        }

        let slot = self.entries.lock().entry(service.to_string()).or_default().clone();
        if let Some(links) = slot.get() {
            debug!("Index cache hit for {}", service);
            return Ok(links.clone());
        }

        let result = slot
            .get_or_try_init(|| async {
                debug!("Index cache miss for {}", service);
                let links = self.fetch_index(service).await?.into_links(service)?;
                Ok::<_, LadokClientError>(Arc::from(links))
            })
            .await
            .map(Arc::clone);
        if result.is_err() {
            self.forget_failed(service, &slot);
        }
        result
    }

    fn forget_failed(&self, service: &str, slot: &Slot) {
        let mut entries = self.entries.lock();
        let stale = entries
            .get(service)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            entries.remove(service);
        }
    }

    /// Fetch a service index, bypassing the cache
    #[instrument(skip(self))]
    pub async fn fetch_index(&self, service: &str) -> Result<ServiceIndex> {
        if service.is_empty() {
            return Err(ApiError::missing_argument("service").into());
        }

        let url = url::Url::parse(&self.index_url(service))?;
        let request = self
            .options
            .create_get_options_for_service(service, TransportOverrides::default())?;
        let response = self.transport.execute(&HttpMethod::Get, &url, request).await?;
        decode_response(response)
    }

    /// Services whose links are currently cached
    pub fn cached_services(&self) -> Vec<String> {
        let mut services: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(service, _)| service.clone())
            .collect();
        services.sort();
        services
    }
}
