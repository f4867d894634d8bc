//! Link model: methods, links, service indexes and link lookup

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// HTTP method advertised by a link
///
/// Index documents may advertise methods this client cannot follow. Those
/// decode as [`HttpMethod::Other`] so the rest of the index stays usable;
/// negotiating or following such a link fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Other(String),
}

impl HttpMethod {
    /// Upper-case wire token
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other(method) => method,
        }
    }

    /// Whether requests with this method carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl From<String> for HttpMethod {
    fn from(method: String) -> Self {
        match method.as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other(method),
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(method: &str) -> Self {
        HttpMethod::from(method.to_string())
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Other(method) => method,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HttpMethod::from(s.to_ascii_uppercase()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hyperlink published by a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Relation: `self` or `http://relations.<domain>/<service>/...`
    pub rel: String,
    pub method: HttpMethod,
    pub uri: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, method: HttpMethod, uri: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            method,
            uri: uri.into(),
        }
    }

    /// A `self` link: no discoverable relation, content type comes from the URI
    pub fn self_link(method: HttpMethod, uri: impl Into<String>) -> Self {
        Self::new(SELF_REL, method, uri)
    }
}

/// Relation token for links that negotiate from their URI
pub const SELF_REL: &str = "self";

/// Index document served at `{base}/{service}/service/index`
///
/// Only the link collection is kept; any other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIndex {
    #[serde(default)]
    pub link: Option<Vec<Link>>,
}

impl ServiceIndex {
    /// Take the link collection, failing if the document has none
    pub fn into_links(self, service: &str) -> ApiResult<Vec<Link>> {
        self.link
            .ok_or_else(|| ApiError::new(format!("service index for {} has no links", service)))
    }
}

/// Find the link with the given relation and method
///
/// When several links match, the last one wins.
pub fn find_link(links: &[Link], rel: &str, method: &HttpMethod) -> ApiResult<Link> {
    if rel.is_empty() {
        return Err(ApiError::missing_argument("rel"));
    }
    links
        .iter()
        .rev()
        .find(|link| link.rel == rel && &link.method == method)
        .cloned()
        .ok_or_else(|| ApiError::new(format!("link not found for {}, {}", rel, method)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REL1: &str = "http://relations.ladok.se/resultat/rel1";
    const REL2: &str = "http://relations.ladok.se/resultat/uri2";
    const URI1_GET: &str = "http://a.se/resultat/uri1GET";
    const URI1_POST: &str = "http://a.se/resultat/uri1POST";
    const URI2: &str = "http://a.se/resultat/uri2";

    fn links() -> Vec<Link> {
        vec![
            Link::new(REL1, HttpMethod::Get, URI1_GET),
            Link::new(REL1, HttpMethod::Post, URI1_POST),
            Link::new(REL2, HttpMethod::Get, URI2),
        ]
    }

    #[test]
    fn test_find_get_link_by_default() {
        let link = find_link(&links(), REL1, &HttpMethod::default()).unwrap();
        assert_eq!(link.uri, URI1_GET);
    }

    #[test]
    fn test_find_post_link() {
        let link = find_link(&links(), REL1, &HttpMethod::Post).unwrap();
        assert_eq!(link.uri, URI1_POST);
    }

    #[test]
    fn test_find_second_uri() {
        let link = find_link(&links(), REL2, &HttpMethod::Get).unwrap();
        assert_eq!(link.uri, URI2);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let mut links = links();
        links.push(Link::new(REL1, HttpMethod::Get, "http://a.se/resultat/later"));
        let link = find_link(&links, REL1, &HttpMethod::Get).unwrap();
        assert_eq!(link.uri, "http://a.se/resultat/later");
    }

    #[test]
    fn test_not_found() {
        let err = find_link(
            &links(),
            "http://relations.ladok.se/resultat/notfound",
            &HttpMethod::Get,
        )
        .unwrap_err();
        assert!(err.message.starts_with("link not found"));
    }

    #[test]
    fn test_empty_rel_rejected() {
        let err = find_link(&links(), "", &HttpMethod::Get).unwrap_err();
        assert_eq!(err, ApiError::missing_argument("rel"));
    }

    #[test]
    fn test_method_serde() {
        let link: Link = serde_json::from_str(
            r#"{"rel":"self","method":"PATCH","uri":"https://host/resultat/1"}"#,
        )
        .unwrap();
        assert_eq!(link.method, HttpMethod::Other("PATCH".to_string()));

        let json = serde_json::to_value(Link::self_link(HttpMethod::Delete, "u")).unwrap();
        assert_eq!(json["method"], "DELETE");
    }

    #[test]
    fn test_method_from_str_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn test_service_index_without_links() {
        let index: ServiceIndex = serde_json::from_str(r#"{"other":1}"#).unwrap();
        assert!(index.into_links("resultat").is_err());
    }
}
