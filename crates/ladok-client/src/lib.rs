//! Ladok Client Library
//!
//! A client for hypermedia REST APIs made of independently versioned
//! services. Every service publishes an index of the links it supports; the
//! client discovers and caches those links and follows them with negotiated
//! `Accept`/`Content-Type` headers instead of hard-coding endpoint URLs.
//!
//! # Example
//!
//! ```rust,no_run
//! use ladok_client::{ClientIdentity, FollowOptions, HttpMethod, LadokApi, LadokClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let identity = ClientIdentity::from_pkcs12_file("client.p12", "passphrase")?;
//!     let client = LadokClient::builder("https://api.ladok.se")
//!         .identity(identity)
//!         .build()?;
//!
//!     // Resolve a relation through the resultat service index
//!     let link = client
//!         .find_index_link("http://relations.ladok.se/resultat/studieresultat", HttpMethod::Get)
//!         .await?;
//!
//!     // Follow it with extra query parameters
//!     let results = client
//!         .follow_link(&link, FollowOptions::new().query("studentUID", "abc"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Code written against the [`LadokApi`] trait can be tested with
//! [`testing::MockLadokApi`]; the engine itself can be driven through
//! [`testing::StubTransport`] or a [`testing::TestServer`].

mod client;
mod config;
mod error;
mod index;
mod options;
mod session;
pub mod testing;
mod transport;

pub use client::{FollowOptions, LadokApi, LadokClient, LadokClientBuilder};
pub use config::{
    ClientConfig, ClientConfigBuilder, ConfigError, ConnectionConfig, IdentityConfig,
    TimeoutsConfig,
};
pub use error::{LadokClientError, Result};
pub use index::LinkIndex;
pub use options::{OptionsFactory, RequestDescriptor, TransportOverrides};
pub use session::{ClientIdentity, Session};
pub use transport::{RawResponse, ReqwestTransport, Transport};

// Re-export core types for convenience
pub use ladok_core::{ApiError, ApiProfile, HttpMethod, Link, ServiceIndex, SELF_REL};
