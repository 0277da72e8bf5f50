//! Error types for the digcache resolution engine.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::dns::record::RecordKind;

/// Main error type for digcache operations.
///
/// The `Display` renderings of the lookup variants are the exact messages
/// surfaced to callers, so they must not be reworded casually.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported record type: {0}")]
    UnsupportedType(String),

    #[error("No {kind} records found for {domain}")]
    NoRecords { kind: RecordKind, domain: String },

    #[error("DNS error: {0}")]
    Dns(#[from] ExchangeError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("default_ttl_seconds must be greater than 0")]
    ZeroDefaultTtl,

    #[error("max_cache_entries must be greater than 0")]
    ZeroCacheCapacity,
}

/// Failures of a single query/response exchange with the upstream server.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("UDP exchange with {server} failed: {source}")]
    Udp {
        server: SocketAddr,
        source: io::Error,
    },

    #[error("TCP exchange with {server} failed: {source}")]
    Tcp {
        server: SocketAddr,
        source: io::Error,
    },

    #[error("no response from {server} within the timeout")]
    Timeout { server: SocketAddr },

    #[error("response ID {found} does not match query ID {expected}")]
    IdMismatch { expected: u16, found: u16 },

    #[error("DNS protocol error: {0}")]
    Proto(#[from] hickory_proto::ProtoError),
}

impl ExchangeError {
    /// Whether this failure aborts the whole resolution instead of only the
    /// current candidate domain.
    ///
    /// A UDP socket error (e.g. connection refused) means the upstream is
    /// unreachable and retrying other candidate names cannot help. Timeouts,
    /// TCP failures after fallback, malformed responses, and ID mismatches
    /// are confined to the attempt that produced them.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Udp { .. })
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
