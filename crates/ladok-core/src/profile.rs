//! Relation and media-type conventions of an API deployment
//!
//! Relations look like `http://relations.ladok.se/<service>/<path...>` and
//! every service speaks `application/vnd.ladok-<service>+json`. The vendor
//! token and relation base are configurable so the same rules apply to any
//! deployment following the pattern.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Default vendor token in media types
pub const DEFAULT_VENDOR: &str = "ladok";
/// Default prefix of every relation URI
pub const DEFAULT_RELATION_BASE: &str = "http://relations.ladok.se/";

/// Naming conventions for relations and content types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProfile {
    vendor: String,
    relation_base: String,
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR, DEFAULT_RELATION_BASE)
    }
}

impl ApiProfile {
    /// Create a profile; the relation base always ends with `/`
    pub fn new(vendor: impl Into<String>, relation_base: impl Into<String>) -> Self {
        let mut relation_base = relation_base.into();
        if !relation_base.ends_with('/') {
            relation_base.push('/');
        }
        Self {
            vendor: vendor.into(),
            relation_base,
        }
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn relation_base(&self) -> &str {
        &self.relation_base
    }

    /// Name of the service owning a relation
    ///
    /// `self` and relations outside the relation base have no service.
    pub fn service_for_relation<'a>(&self, rel: &'a str) -> ApiResult<&'a str> {
        rel.strip_prefix(self.relation_base.as_str())
            .and_then(|rest| rest.split_once('/'))
            .map(|(service, _)| service)
            .filter(|service| !service.is_empty())
            .ok_or_else(|| {
                ApiError::new(format!("unable to determine service from rel: {}", rel))
            })
    }

    /// Synthetic relation for an endpoint reached by path
    pub fn relation_for_path(&self, path: &str) -> String {
        format!("{}{}", self.relation_base, path.trim_start_matches('/'))
    }

    /// Media type used for `Accept` and `Content-Type` of a service
    pub fn default_content_type(&self, service: &str) -> String {
        format!("application/vnd.{}-{}+json", self.vendor, service)
    }
}

/// Name of the service a URI belongs to: the first path segment
///
/// The path needs at least two segments; `https://host/resultat/42` and
/// `https://host/examen/` qualify, `https://host/` and `https://host/x` do not.
pub fn service_for_uri(uri: &str) -> ApiResult<String> {
    let invalid = || ApiError::new(format!("unable to parse service name from uri: {}", uri));
    let url = Url::parse(uri).map_err(|_| invalid())?;
    let mut segments = url.path_segments().ok_or_else(invalid)?;
    match (segments.next(), segments.next()) {
        (Some(service), Some(_)) if !service.is_empty() => Ok(service.to_string()),
        _ => Err(invalid()),
    }
}
