//! Configuration loading and validation.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result, ValidationError};

/// Standard DNS port, applied when the resolver address omits one.
const DNS_PORT: u16 = 53;

/// Main configuration for digcache.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upstream DNS resolver address. Accepts a bare IP ("8.8.8.8") or an
    /// explicit socket address ("8.8.8.8:53").
    #[serde(
        default = "default_upstream_resolver",
        deserialize_with = "deserialize_resolver_addr"
    )]
    pub upstream_resolver: SocketAddr,

    /// TTL in seconds applied to cached entries when a response carries none.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,

    /// Maximum number of entries the cache retains after a cleaning pass.
    #[serde(default = "default_max_entries")]
    pub max_cache_entries: usize,
}

const fn default_upstream_resolver() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), DNS_PORT)
}

const fn default_ttl() -> u64 {
    300
}

const fn default_max_entries() -> usize {
    1000
}

fn deserialize_resolver_addr<'de, D>(deserializer: D) -> std::result::Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(serde::de::Error::custom)
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.default_ttl_seconds == 0 {
            return Err(ConfigError::from(ValidationError::ZeroDefaultTtl).into());
        }

        if self.max_cache_entries == 0 {
            return Err(ConfigError::from(ValidationError::ZeroCacheCapacity).into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream_resolver: default_upstream_resolver(),
            default_ttl_seconds: default_ttl(),
            max_cache_entries: default_max_entries(),
        }
    }
}
