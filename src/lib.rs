//! Digcache - A caching DNS lookup engine.
//!
//! Digcache resolves DNS records by speaking the wire protocol directly to a
//! single upstream resolver, over UDP with a TCP fallback on truncation, and
//! keeps answers in a bounded TTL cache so repeated lookups skip the network.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`]: Configuration loading and validation
//! - [`dns`]: Query construction, transport, and resolution
//! - [`cache`]: Bounded TTL cache for resolved answers
//! - [`error`]: Error types
//!
//! # Testing
//!
//! The transport sits behind a trait so resolution logic can be exercised
//! with scripted responses and no network access:
//!
//! ```rust
//! use digcache::dns::RecordKind;
//!
//! // Record types are validated before any query is sent
//! let kind: RecordKind = "mx".parse().unwrap();
//! assert!(kind.tries_base_domain());
//! ```

pub mod cache;
pub mod config;
pub mod dns;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
