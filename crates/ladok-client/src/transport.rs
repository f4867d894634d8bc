//! Transport seam between the link engine and the HTTP stack

use std::time::Duration;

use async_trait::async_trait;
use ladok_core::{ApiError, HttpMethod};
use parking_lot::Mutex;
use reqwest::cookie::CookieStore;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method};
use tracing::{debug, trace};
use url::Url;

use crate::error::Result;
use crate::options::RequestDescriptor;
use crate::session::ClientIdentity;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body
    pub fn json(body: &serde_json::Value) -> Self {
        Self::new(200, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange described by a [`RequestDescriptor`]
///
/// Implementations must apply the descriptor's session (cookies in and out)
/// and identity, and may honour its timeout.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: &HttpMethod,
        url: &Url,
        request: RequestDescriptor,
    ) -> Result<RawResponse>;
}

/// [`Transport`] backed by reqwest
///
/// Cookies are read from and written to the descriptor's session on every
/// exchange. Redirects are returned to the caller as non-2xx responses. A client carrying a TLS identity is built on first use and
/// reused while requests keep presenting the same identity.
pub struct ReqwestTransport {
    timeout: Duration,
    connect_timeout: Duration,
    plain: Client,
    identified: Mutex<Option<(ClientIdentity, Client)>>,
}

impl ReqwestTransport {
    /// Create a transport with default timeouts
    pub fn new() -> Result<Self> {
        Self::with_timeouts(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a transport with custom timeouts
    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let plain = Self::builder(timeout, connect_timeout).build()?;
        Ok(Self {
            timeout,
            connect_timeout,
            plain,
            identified: Mutex::new(None),
        })
    }

    fn builder(timeout: Duration, connect_timeout: Duration) -> ClientBuilder {
        // Redirects are not followed: each hop would bypass the session jar
        Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(Policy::none())
    }

    fn client_for(&self, identity: Option<&ClientIdentity>) -> Result<Client> {
        let Some(identity) = identity else {
            return Ok(self.plain.clone());
        };

        let mut slot = self.identified.lock();
        if let Some((cached, client)) = slot.as_ref() {
            if cached == identity {
                return Ok(client.clone());
            }
        }

        debug!("Building TLS client for identity");
        let client = Self::builder(self.timeout, self.connect_timeout)
            .identity(identity.to_reqwest()?)
            .build()?;
        *slot = Some((identity.clone(), client.clone()));
        Ok(client)
    }
}

fn reqwest_method(method: &HttpMethod) -> Result<Method> {
    match method {
        HttpMethod::Get => Ok(Method::GET),
        HttpMethod::Post => Ok(Method::POST),
        HttpMethod::Put => Ok(Method::PUT),
        HttpMethod::Delete => Ok(Method::DELETE),
        HttpMethod::Other(method) => Err(ApiError::unsupported_method(method).into()),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        method: &HttpMethod,
        url: &Url,
        request: RequestDescriptor,
    ) -> Result<RawResponse> {
        let RequestDescriptor {
            headers,
            body,
            overrides,
        } = request;

        let client = self.client_for(overrides.identity.as_ref())?;
        let mut builder = client
            .request(reqwest_method(method)?, url.clone())
            .headers(headers);

        if let Some(cookies) = overrides
            .session
            .as_ref()
            .and_then(|session| session.jar().cookies(url))
        {
            builder = builder.header(COOKIE, cookies);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = overrides.timeout {
            builder = builder.timeout(timeout);
        }

        trace!("{} {}", method, url);
        let response = builder.send().await?;

        if let Some(session) = overrides.session.as_ref() {
            let mut set_cookies = response.headers().get_all(SET_COOKIE).iter();
            session.jar().set_cookies(&mut set_cookies, url);
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
