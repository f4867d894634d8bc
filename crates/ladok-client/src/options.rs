//! Request options: the transport-agnostic description of one call

use std::time::Duration;

use http::HeaderMap;
use ladok_core::{headers_for_index_fetch, headers_for_link, ApiProfile, Link};

use crate::error::Result;
use crate::session::{ClientIdentity, Session};

/// Per-call settings passed through to the transport
#[derive(Debug, Clone, Default)]
pub struct TransportOverrides {
    /// Request timeout, if the transport supports one
    pub timeout: Option<Duration>,
    /// Cookie jar; always replaced by the client's own session
    pub session: Option<Session>,
    /// TLS identity; always replaced by the client's own identity
    pub identity: Option<ClientIdentity>,
}

impl TransportOverrides {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Everything the transport needs besides method and URL
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    pub headers: HeaderMap,
    /// JSON-encoded body for POST and PUT
    pub body: Option<String>,
    pub overrides: TransportOverrides,
}

/// Builds request descriptors from links, headers and the client's session
#[derive(Debug, Clone)]
pub struct OptionsFactory {
    profile: ApiProfile,
    session: Session,
    identity: Option<ClientIdentity>,
}

impl OptionsFactory {
    pub fn new(profile: ApiProfile, session: Session, identity: Option<ClientIdentity>) -> Self {
        Self {
            profile,
            session,
            identity,
        }
    }

    pub fn profile(&self) -> &ApiProfile {
        &self.profile
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Options for a body-less GET or DELETE
    pub fn create_get_or_delete_options(
        &self,
        link: &Link,
        headers: &HeaderMap,
        overrides: TransportOverrides,
    ) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor {
            headers: headers_for_link(&self.profile, link, headers)?,
            body: None,
            overrides: self.bind_session(overrides),
        })
    }

    /// Options for a POST or PUT; the body is encoded as JSON
    pub fn create_put_or_post_options(
        &self,
        link: &Link,
        body: Option<&serde_json::Value>,
        headers: &HeaderMap,
        overrides: TransportOverrides,
    ) -> Result<RequestDescriptor> {
        let body = body.map(serde_json::to_string).transpose()?;
        Ok(RequestDescriptor {
            headers: headers_for_link(&self.profile, link, headers)?,
            body,
            overrides: self.bind_session(overrides),
        })
    }

    /// Options for fetching a service index
    pub fn create_get_options_for_service(
        &self,
        service: &str,
        overrides: TransportOverrides,
    ) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor {
            headers: headers_for_index_fetch(&self.profile, service)?,
            body: None,
            overrides: self.bind_session(overrides),
        })
    }

    /// Session and identity are not caller-controlled
    fn bind_session(&self, overrides: TransportOverrides) -> TransportOverrides {
        TransportOverrides {
            session: Some(self.session.clone()),
            identity: self.identity.clone(),
            ..overrides
        }
    }
}
