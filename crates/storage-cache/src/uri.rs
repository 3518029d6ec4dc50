//! Cache connection URI parsing.
//!
//! Accepted form:
//!
//! ```text
//! redis://[user[:password]@]host[:port][/db]
//! ```
//!
//! The port defaults to [`DEFAULT_PORT`] and the logical database to 0. IPv6
//! hosts are written in brackets (`redis://[::1]:6379`). Credentials are
//! percent-decoded, so reserved characters in a password are written as
//! `%40`, `%2F` and so on.

use std::fmt;

use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo};
use url::Url;

use crate::error::{CacheStorageError, Result};

/// URI scheme accepted by [`CacheUri::parse`].
pub const SCHEME: &str = "redis";

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 6379;

/// A parsed cache server address.
#[derive(Clone, PartialEq, Eq)]
pub struct CacheUri {
    url: Url,
    host: String,
    port: u16,
    db: i64,
    username: Option<String>,
    password: Option<String>,
}

impl CacheUri {
    /// Parses a `redis://` URI.
    ///
    /// # Errors
    ///
    /// Returns [`CacheStorageError::InvalidUri`] when the URI is malformed,
    /// the scheme is wrong, the host is empty, or the database selector is
    /// not a non-negative integer.
    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = |reason: &str| CacheStorageError::InvalidUri {
            uri: mask_uri(uri),
            reason: reason.to_owned(),
        };

        let url = Url::parse(uri).map_err(|err| invalid(&err.to_string()))?;
        if url.scheme() != SCHEME {
            return Err(invalid("expected redis:// scheme"));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("host is empty"));
        }

        // The driver owns the port default, db selection and credential decoding.
        let info = url
            .clone()
            .into_connection_info()
            .map_err(|err| invalid(&err.to_string()))?;
        let ConnectionAddr::Tcp(host, port) = info.addr else {
            return Err(invalid("expected a TCP address"));
        };
        if info.redis.db < 0 {
            return Err(invalid("database must be a non-negative integer"));
        }

        Ok(Self {
            url,
            host,
            port,
            db: info.redis.db,
            username: info.redis.username,
            password: info.redis.password,
        })
    }

    /// Server host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Logical database index.
    #[must_use]
    pub fn db(&self) -> i64 {
        self.db
    }

    /// Username, if the URI carried credentials.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns `true` if the URI carried a password.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Converts into the redis client's connection description.
    #[must_use]
    pub fn to_connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                username: self.username.clone(),
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }

    fn masked(&self) -> Url {
        let mut masked = self.url.clone();
        if masked.password().is_some() {
            let _ = masked.set_password(Some("***"));
        }
        masked
    }
}

/// Masks the password in `uri` so it can be logged.
///
/// A URI that does not parse is hidden entirely when it may hold credentials.
fn mask_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        },
        Err(_) if uri.contains('@') => "***".to_owned(),
        Err(_) => uri.to_owned(),
    }
}

impl fmt::Display for CacheUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.masked().as_str())
    }
}

impl fmt::Debug for CacheUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheUri").field(&self.masked().as_str()).finish()
    }
}

impl std::str::FromStr for CacheUri {
    type Err = CacheStorageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
