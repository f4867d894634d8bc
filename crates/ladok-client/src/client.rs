//! Link-following client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use ladok_core::{find_link, ApiError, ApiProfile, HttpMethod, Link};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{LadokClientError, Result};
use crate::index::LinkIndex;
use crate::options::{OptionsFactory, TransportOverrides};
use crate::session::{ClientIdentity, Session};
use crate::transport::{
    RawResponse, ReqwestTransport, Transport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT,
};

/// Operations shared by [`LadokClient`] and its test double
///
/// Code written against this trait can be unit tested with
/// [`MockLadokApi`](crate::testing::MockLadokApi).
#[async_trait]
pub trait LadokApi: Send + Sync {
    /// Find a link in the index of the service owning `rel`
    async fn find_index_link(&self, rel: &str, method: HttpMethod) -> Result<Link>;

    /// Find a link in a collection the caller already holds
    ///
    /// The last link matching both `rel` and `method` wins.
    fn find_link(&self, links: &[Link], rel: &str, method: HttpMethod) -> Result<Link> {
        Ok(find_link(links, rel, &method)?)
    }

    /// Build a link for an endpoint reached by path instead of discovery
    fn create_link_from_path(&self, path: &str, method: HttpMethod) -> Link;

    /// Call a link and decode the JSON response
    async fn follow_link(&self, link: &Link, options: FollowOptions) -> Result<serde_json::Value>;

    /// Whether a service answers its index request; never fails
    async fn status_for_service(&self, service: &str) -> bool;
}

/// Caller input for [`LadokApi::follow_link`]
#[derive(Debug, Clone, Default)]
pub struct FollowOptions {
    /// Merged into the link's query; replaces existing keys of the same name
    pub query_params: Vec<(String, String)>,
    /// JSON body for POST and PUT links
    pub body: Option<serde_json::Value>,
    /// Extra headers; these win over negotiated ones
    pub headers: HeaderMap,
    pub overrides: TransportOverrides,
}

impl FollowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header from strings, validating name and value
    pub fn try_header(self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::new(format!("invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ApiError::new(format!("invalid header value: {}", value)))?;
        Ok(self.header(name, value))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.overrides.timeout = Some(timeout);
        self
    }
}

/// Hypermedia API client
///
/// Discovers links through each service's index, caches them for its own
/// lifetime and follows them with negotiated headers. The cookie session and
/// TLS identity belong to the client and are applied to every request.
pub struct LadokClient {
    base_url: String,
    profile: ApiProfile,
    transport: Arc<dyn Transport>,
    options: OptionsFactory,
    index: LinkIndex,
}

impl LadokClient {
    /// Create a client with the default profile, no identity and default timeouts
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://api.ladok.se"
    pub fn new(base_url: &str) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::builder(&config.connection.base_url)
            .profile(config.profile())
            .timeouts(config.timeouts.request(), config.timeouts.connect());
        if let Some(identity) = &config.identity {
            builder = builder.identity(
                identity
                    .load()
                    .map_err(|e| LadokClientError::Config(e.to_string()))?,
            );
        }
        builder.build()
    }

    pub fn builder(base_url: impl Into<String>) -> LadokClientBuilder {
        LadokClientBuilder::new(base_url)
    }

    /// API root without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn profile(&self) -> &ApiProfile {
        &self.profile
    }

    /// Cookie session shared by all requests of this client
    pub fn session(&self) -> &Session {
        self.options.session()
    }

    /// The service index cache
    pub fn index(&self) -> &LinkIndex {
        &self.index
    }

    /// Follow a link and decode the response into `T`
    pub async fn follow_link_as<T: DeserializeOwned>(
        &self,
        link: &Link,
        options: FollowOptions,
    ) -> Result<T> {
        let value = self.follow_link(link, options).await?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl LadokApi for LadokClient {
    #[instrument(skip(self))]
    async fn find_index_link(&self, rel: &str, method: HttpMethod) -> Result<Link> {
        if rel.is_empty() {
            return Err(ApiError::missing_argument("rel").into());
        }
        let service = self.profile.service_for_relation(rel)?;
        let links = self.index.links_for(service).await?;
        Ok(find_link(&links, rel, &method)?)
    }

    fn create_link_from_path(&self, path: &str, method: HttpMethod) -> Link {
        Link {
            rel: self.profile.relation_for_path(path),
            method,
            uri: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
        }
    }

    #[instrument(skip(self, link, options), fields(rel = %link.rel, method = %link.method))]
    async fn follow_link(&self, link: &Link, options: FollowOptions) -> Result<serde_json::Value> {
        if link.uri.is_empty() {
            return Err(ApiError::missing_argument("link").into());
        }

        let url = merge_query(&link.uri, &options.query_params)?;
        let FollowOptions {
            body,
            headers,
            overrides,
            ..
        } = options;

        let request = match link.method {
            HttpMethod::Get | HttpMethod::Delete => self
                .options
                .create_get_or_delete_options(link, &headers, overrides)?,
            HttpMethod::Post | HttpMethod::Put => self.options.create_put_or_post_options(
                link,
                body.as_ref(),
                &headers,
                overrides,
            )?,
            HttpMethod::Other(ref method) => {
                return Err(ApiError::unsupported_method(method).into())
            }
        };

        debug!("Following {} {}", link.method, url);
        let response = self.transport.execute(&link.method, &url, request).await?;
        decode_response(response)
    }

    #[instrument(skip(self))]
    async fn status_for_service(&self, service: &str) -> bool {
        match self.index.fetch_index(service).await {
            Ok(_) => true,
            Err(err) => {
                warn!("Service {} unavailable: {}", service, err);
                false
            }
        }
    }
}

/// Builder for [`LadokClient`]
pub struct LadokClientBuilder {
    base_url: String,
    profile: ApiProfile,
    identity: Option<ClientIdentity>,
    session: Session,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl LadokClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            profile: ApiProfile::default(),
            identity: None,
            session: Session::new(),
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Vendor and relation conventions
    pub fn profile(mut self, profile: ApiProfile) -> Self {
        self.profile = profile;
        self
    }

    /// TLS client certificate presented on every request
    pub fn identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Start from an existing cookie session
    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Replace the reqwest transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Timeouts for the default transport
    pub fn timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn build(self) -> Result<LadokClient> {
        Url::parse(&self.base_url)?;
        let base_url = self.base_url.trim_end_matches('/').to_string();

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeouts(
                self.timeout,
                self.connect_timeout,
            )?),
        };
        let options = OptionsFactory::new(self.profile.clone(), self.session, self.identity);
        let index = LinkIndex::new(base_url.clone(), transport.clone(), options.clone());

        Ok(LadokClient {
            base_url,
            profile: self.profile,
            transport,
            options,
            index,
        })
    }
}

/// Merge query parameters into a URI
///
/// Existing pairs whose key is supplied by the caller are dropped; the rest
/// keep their order and the caller's pairs follow.
pub(crate) fn merge_query(uri: &str, params: &[(String, String)]) -> Result<Url> {
    let mut url = Url::parse(uri)?;
    if params.is_empty() {
        return Ok(url);
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter().chain(params.iter()));
    Ok(url)
}

/// Decode a transport response
///
/// Non-success statuses become [`ApiError`]s carrying the status. An empty
/// body decodes as JSON `null`.
pub(crate) fn decode_response<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    if !response.is_success() {
        return Err(ApiError::with_status(response.status, error_message(&response)).into());
    }

    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| LadokClientError::ParseError(e.to_string()))
}

fn error_message(response: &RawResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["message", "error"]
                .iter()
                .find_map(|key| body.get(key).and_then(|v| v.as_str()).map(String::from))
        })
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}
