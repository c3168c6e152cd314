use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DucqError, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_COMMAND: &str = "subscribe";
pub const DEFAULT_ROUTE: &str = "*";

/// Route the bus uses for its own log stream.
pub const MONITOR_ROUTE: &str = "__MONITOR__";

const SCHEME: &str = "ws";

/// # Endpoint
///
/// The reconnect key of a session. Changing either field tears the connection
/// down; nothing else does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `ws://<host>:<port>`, validated.
    pub fn address(&self) -> Result<Url> {
        let raw = format!("{}://{}:{}", SCHEME, self.host, self.port);
        let url = Url::parse(&raw).map_err(|e| DucqError::InvalidAddress {
            address: raw.clone(),
            reason: e.to_string(),
        })?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(DucqError::InvalidAddress {
                address: raw,
                reason: "missing host".to_string(),
            });
        }
        Ok(url)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// # Greeting
///
/// The single frame a session sends once its connection is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub command: String,
    pub route: String,
    pub payload: String,
}

impl Greeting {
    pub fn new(command: impl Into<String>, route: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            route: route.into(),
            payload: payload.into(),
        }
    }

    /// Default greeting retargeted at `route`.
    pub fn subscribe(route: impl Into<String>) -> Self {
        Self::new(DEFAULT_COMMAND, route, "")
    }

    /// Wire form: `"<command> <route>\n<payload>"`.
    pub fn to_frame(&self) -> String {
        format!("{} {}\n{}", self.command, self.route, self.payload)
    }

    /// Caption shown above a panel, e.g. `subscribe to '*'`.
    pub fn caption(&self) -> String {
        format!("{} to '{}'", self.command, self.route)
    }
}

impl Default for Greeting {
    fn default() -> Self {
        Self::subscribe(DEFAULT_ROUTE)
    }
}
