//! Test utilities for ladok-client
//!
//! - [`MockLadokApi`] stands in for [`LadokClient`] in consumers' unit tests
//! - [`StubTransport`] answers canned responses and records every request
//! - [`TestServer`] runs an axum router and points a real client at it

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use ladok_core::{ApiError, ApiProfile, HttpMethod, Link};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use url::Url;

use crate::client::{FollowOptions, LadokApi, LadokClient};
use crate::error::{LadokClientError, Result};
use crate::options::RequestDescriptor;
use crate::transport::{RawResponse, Transport};

/// What a mock responder receives
#[derive(Debug, Clone)]
pub struct FollowRequest {
    pub link: Link,
    pub options: FollowOptions,
}

type Responder = Arc<dyn Fn(FollowRequest) -> BoxFuture<'static, Result<serde_json::Value>> + Send + Sync>;
type LinkMatcher = Box<dyn Fn(&Link) -> bool + Send + Sync>;

struct Rule {
    matches: LinkMatcher,
    responder: Responder,
}

/// Rule-driven stand-in for [`LadokClient`]
///
/// Responses are registered per relation or per exact link; the most
/// recently registered matching rule answers. Following a link no rule
/// matches fails with an [`ApiError`].
///
/// ```
/// use ladok_client::testing::MockLadokApi;
/// use ladok_client::{FollowOptions, HttpMethod, LadokApi};
///
/// # tokio_test::block_on(async {
/// let api = MockLadokApi::new();
/// api.respond_on_rel_with("http://relations.ladok.se/resultat/R", serde_json::json!({"ok": true}));
///
/// let link = api.find_index_link("http://relations.ladok.se/resultat/R", HttpMethod::Get).await.unwrap();
/// let value = api.follow_link(&link, FollowOptions::new()).await.unwrap();
/// assert_eq!(value["ok"], true);
/// # });
/// ```
#[derive(Default)]
pub struct MockLadokApi {
    profile: ApiProfile,
    rules: Mutex<Vec<Rule>>,
    statuses: Mutex<HashMap<String, bool>>,
    follows: AtomicUsize,
}

impl MockLadokApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use non-default relation conventions for `create_link_from_path`
    pub fn with_profile(profile: ApiProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Answer every link with relation `rel`
    pub fn respond_on_rel<F, Fut>(&self, rel: impl Into<String>, responder: F)
    where
        F: Fn(FollowRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        let rel = rel.into();
        self.push(Box::new(move |link| link.rel == rel), responder);
    }

    /// Answer every link with relation `rel` with a fixed value
    pub fn respond_on_rel_with(&self, rel: impl Into<String>, response: serde_json::Value) {
        self.respond_on_rel(rel, move |_| {
            let response = response.clone();
            async move { Ok(response) }
        });
    }

    /// Answer links equal to `link` (relation, method and URI)
    pub fn respond_on_link<F, Fut>(&self, link: Link, responder: F)
    where
        F: Fn(FollowRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        self.push(Box::new(move |candidate| *candidate == link), responder);
    }

    /// Answer links equal to `link` with a fixed value
    pub fn respond_on_link_with(&self, link: Link, response: serde_json::Value) {
        self.respond_on_link(link, move |_| {
            let response = response.clone();
            async move { Ok(response) }
        });
    }

    /// Set what `status_for_service` reports for a service (default `true`)
    pub fn set_service_status(&self, service: impl Into<String>, up: bool) {
        self.statuses.lock().insert(service.into(), up);
    }

    /// Number of follows answered by a rule
    pub fn follow_count(&self) -> usize {
        self.follows.load(Ordering::SeqCst)
    }

    fn push<F, Fut>(&self, matches: LinkMatcher, responder: F)
    where
        F: Fn(FollowRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        let responder: Responder = Arc::new(move |request| responder(request).boxed());
        self.rules.lock().push(Rule { matches, responder });
    }
}

#[async_trait]
impl LadokApi for MockLadokApi {
    async fn find_index_link(&self, rel: &str, method: HttpMethod) -> Result<Link> {
        Ok(Link::new(rel, method, ""))
    }

    fn create_link_from_path(&self, path: &str, method: HttpMethod) -> Link {
        Link::new(self.profile.relation_for_path(path), method, path)
    }

    async fn follow_link(&self, link: &Link, options: FollowOptions) -> Result<serde_json::Value> {
        let responder = self
            .rules
            .lock()
            .iter()
            .rev()
            .find(|rule| (rule.matches)(link))
            .map(|rule| rule.responder.clone());

        match responder {
            Some(responder) => {
                self.follows.fetch_add(1, Ordering::SeqCst);
                responder(FollowRequest {
                    link: link.clone(),
                    options,
                })
                .await
            }
            None => Err(ApiError::new(format!(
                "no response registered for {} {} {}",
                link.method, link.rel, link.uri
            ))
            .into()),
        }
    }

    async fn status_for_service(&self, service: &str) -> bool {
        self.statuses.lock().get(service).copied().unwrap_or(true)
    }
}

/// A request seen by [`StubTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub request: RequestDescriptor,
}

/// In-memory [`Transport`] with canned responses
///
/// Requests without a registered response get a 404. A failing stub rejects
/// every request as if the connection was refused.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<Vec<(HttpMethod, String, RawResponse)>>,
    requests: Mutex<Vec<RecordedRequest>>,
    failing: bool,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every request fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Register a response for `method url`; later registrations win
    pub fn respond(&self, method: HttpMethod, url: impl Into<String>, response: RawResponse) {
        self.routes.lock().push((method, url.into(), response));
    }

    /// Register a JSON 200 response for a GET
    pub fn respond_json(&self, url: impl Into<String>, body: serde_json::Value) {
        self.respond(HttpMethod::Get, url, RawResponse::json(&body));
    }

    /// All requests seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests sent to `url`
    pub fn count_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|recorded| recorded.url.as_str() == url)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(
        &self,
        method: &HttpMethod,
        url: &Url,
        request: RequestDescriptor,
    ) -> Result<RawResponse> {
        self.requests.lock().push(RecordedRequest {
            method: method.clone(),
            url: url.clone(),
            request,
        });
        // Let concurrent callers interleave the way a network call would
        tokio::task::yield_now().await;

        if self.failing {
            return Err(LadokClientError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused: {}", url),
            )));
        }

        let response = self
            .routes
            .lock()
            .iter()
            .rev()
            .find(|(m, u, _)| m == method && u == url.as_str())
            .map(|(_, _, response)| response.clone());
        Ok(response.unwrap_or_else(|| RawResponse::new(404, "")))
    }
}

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: LadokClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve an axum Router and create a client for it
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use ladok_client::testing::TestServer;
    ///
    /// let router = Router::new().route(
    ///     "/resultat/service/index",
    ///     get(|| async { Json(serde_json::json!({ "link": [] })) }),
    /// );
    /// let server = TestServer::start(router).await?;
    /// assert!(server.client.status_for_service("resultat").await);
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom timeouts
    pub async fn start_with_timeout<S>(
        router: axum::Router<S>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let client = LadokClient::builder(format!("http://{}", addr))
            .timeouts(timeout, connect_timeout)
            .build()?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &LadokClient {
        &self.client
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
