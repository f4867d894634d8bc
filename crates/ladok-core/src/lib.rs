//! Ladok Core - link model and negotiation rules
//!
//! Pure value types and rules shared by the client and its test double:
//!
//! - [`Link`], [`HttpMethod`] and [`ServiceIndex`], the hypermedia model
//! - [`ApiError`], the single domain error
//! - [`ApiProfile`], mapping relations to services and services to media types
//! - [`negotiate`], default `Accept`/`Content-Type` headers per link
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod link;
pub mod negotiate;
pub mod profile;

pub use error::{ApiError, ApiResult};
pub use link::{find_link, HttpMethod, Link, ServiceIndex, SELF_REL};
pub use negotiate::{headers_for_index_fetch, headers_for_link};
pub use profile::{service_for_uri, ApiProfile, DEFAULT_RELATION_BASE, DEFAULT_VENDOR};
