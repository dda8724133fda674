//! Dispatch target.

use std::fmt;
use std::net::SocketAddr;
use url::Url;

use crate::dispatch::error::{DispatchError, DispatchResult};

/// A validated absolute http(s) URL that every execution in a batch targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parse and validate an endpoint URL.
    pub fn parse(input: &str) -> DispatchResult<Self> {
        let invalid = |reason: String| DispatchError::InvalidEndpoint {
            endpoint: input.to_string(),
            reason,
        };

        let url = Url::parse(input).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{}'", other))),
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self { url })
    }

    /// Endpoint for a local socket address, root path.
    pub fn from_addr(addr: SocketAddr) -> Self {
        // An IP socket address always forms a valid http URL.
        let url = Url::parse(&format!("http://{}/", addr))
            .unwrap_or_else(|_| unreachable!("socket address {} is a valid host", addr));
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
