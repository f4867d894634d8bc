//! Session and identity material handed to the transport
//!
//! Both are opaque to the engine: the cookie jar is filled by the transport
//! from `Set-Cookie` headers, and the identity bundle is only decoded when a
//! TLS connection is built.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use reqwest::cookie::Jar;

use crate::error::Result;

/// Shared cookie jar owned by one client instance
#[derive(Clone, Default)]
pub struct Session {
    jar: Arc<Jar>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying jar
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// Whether both handles refer to the same jar
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.jar, &other.jar)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("jar", &Arc::as_ptr(&self.jar))
            .finish()
    }
}

/// TLS client identity: a PKCS#12 bundle and its passphrase
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pkcs12: Arc<[u8]>,
    passphrase: String,
}

impl ClientIdentity {
    pub fn from_pkcs12(pkcs12: impl Into<Vec<u8>>, passphrase: impl Into<String>) -> Self {
        let pkcs12: Vec<u8> = pkcs12.into();
        Self {
            pkcs12: pkcs12.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Read a PKCS#12 bundle (`.p12` / `.pfx`) from disk
    pub fn from_pkcs12_file(path: impl AsRef<Path>, passphrase: impl Into<String>) -> Result<Self> {
        let pkcs12 = std::fs::read(path.as_ref())?;
        Ok(Self::from_pkcs12(pkcs12, passphrase))
    }

    pub fn pkcs12(&self) -> &[u8] {
        &self.pkcs12
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Decode into a reqwest identity
    pub fn to_reqwest(&self) -> Result<reqwest::Identity> {
        Ok(reqwest::Identity::from_pkcs12_der(
            &self.pkcs12,
            &self.passphrase,
        )?)
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("pkcs12", &format_args!("<{} bytes>", self.pkcs12.len()))
            .field("passphrase", &"<redacted>")
            .finish()
    }
}
