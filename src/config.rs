//! Server configuration from CLI flags, falling back to environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{Result, SipError};

pub const DEFAULT_PORT: u16 = 8080;
pub const HOST_ENV: &str = "SIP_HOST";
pub const PORT_ENV: &str = "SIP_PORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Flags win over `SIP_HOST` / `SIP_PORT`, which win over the defaults.
    pub fn resolve(host: Option<IpAddr>, port: Option<u16>) -> Result<Self> {
        Self::resolve_with(host, port, |key| std::env::var(key).ok())
    }

    pub fn resolve_with(
        host: Option<IpAddr>,
        port: Option<u16>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let host = match host {
            Some(host) => host,
            None => match env(HOST_ENV) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| SipError::Config(format!("Invalid {HOST_ENV}: {raw}")))?,
                None => defaults.host,
            },
        };
        let port = match port {
            Some(port) => port,
            None => match env(PORT_ENV) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| SipError::Config(format!("Invalid {PORT_ENV}: {raw}")))?,
                None => defaults.port,
            },
        };
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
