//! Lookup resolution.
//!
//! Coordinates the cache check, candidate-domain selection, upstream
//! exchange, answer parsing, and the cache write-back. Transport is behind
//! the [`Exchange`] trait so tests can script responses.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::cache::LookupCache;
use crate::dns::record::RecordKind;
use crate::dns::transport::{Exchange, MAX_UDP_PAYLOAD, UdpTcpExchange};
use crate::error::{Error, ExchangeError, Result};

/// Outcome of a resolved lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Formatted result lines, exact-domain records before base-domain ones.
    pub records: Vec<String>,
    /// Whether the cache supplied the records.
    pub cached: bool,
    /// Seconds the result may be reused.
    pub ttl: u32,
}

/// Result of querying one candidate domain.
enum Attempt {
    /// Matching records were parsed out of the answer section.
    Answered { records: Vec<String>, ttl: u32 },
    /// The server answered, but nothing matched the requested kind.
    NoAnswer,
    /// The exchange failed.
    Failed(ExchangeError),
}

/// Resolves lookups against a single upstream server, consulting the shared
/// cache before any network I/O and populating it afterwards.
pub struct Resolver<X: Exchange = UdpTcpExchange> {
    exchange: X,
    cache: Arc<LookupCache>,
    server: SocketAddr,
}

impl Resolver<UdpTcpExchange> {
    /// Create a resolver using the standard UDP/TCP transport.
    pub fn new(server: SocketAddr, cache: Arc<LookupCache>) -> Self {
        Self::with_exchange(UdpTcpExchange::new(), server, cache)
    }
}

impl<X: Exchange> Resolver<X> {
    /// Create a resolver over a custom transport.
    pub fn with_exchange(exchange: X, server: SocketAddr, cache: Arc<LookupCache>) -> Self {
        Self {
            exchange,
            cache,
            server,
        }
    }

    /// Resolve from a caller-supplied record-type string.
    ///
    /// The type string is validated first, so an unsupported type never
    /// reaches the cache or the network.
    pub async fn lookup(&self, domain: &str, record_type: &str) -> Result<Resolution> {
        let kind = record_type.parse::<RecordKind>()?;
        self.resolve(domain, kind).await
    }

    /// Resolve a domain for the given record kind.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn resolve(&self, domain: &str, kind: RecordKind) -> Result<Resolution> {
        let now = Instant::now();
        if let Some(entry) = self.cache.get(domain, kind) {
            let remaining = entry.remaining_ttl(now).as_secs();
            // A remaining TTL of zero seconds means the entry is due for
            // lazy cleaning; resolve it fresh instead of serving it.
            if remaining > 0 {
                debug!(age = ?entry.age(now), "cache hit");
                return Ok(Resolution {
                    records: entry.records,
                    cached: true,
                    ttl: u32::try_from(remaining).unwrap_or(u32::MAX),
                });
            }
        }

        debug!("cache miss, querying upstream");

        let mut records = Vec::new();
        let mut ttl: Option<u32> = None;

        for candidate in candidate_domains(domain, kind) {
            match self.attempt(candidate, kind).await {
                Attempt::Answered {
                    records: found,
                    ttl: found_ttl,
                } => {
                    records.extend(found);
                    ttl = Some(ttl.map_or(found_ttl, |current| current.min(found_ttl)));
                }
                Attempt::NoAnswer => {
                    debug!(%candidate, "no matching records at this name");
                }
                Attempt::Failed(err) if err.is_fatal() => return Err(err.into()),
                Attempt::Failed(err) => {
                    warn!(%candidate, error = %err, "query attempt failed, trying next candidate");
                }
            }
        }

        if records.is_empty() {
            return Err(Error::NoRecords {
                kind,
                domain: domain.to_string(),
            });
        }

        // Keyed on the domain as asked, not the base-domain fallback.
        if let Some(secs) = ttl
            && secs > 0
        {
            self.cache.insert(
                domain,
                kind,
                records.clone(),
                Some(Duration::from_secs(u64::from(secs))),
            );
        }

        Ok(Resolution {
            records,
            cached: false,
            ttl: ttl.unwrap_or(0),
        })
    }

    /// Query one candidate domain and classify the outcome.
    async fn attempt(&self, domain: &str, kind: RecordKind) -> Attempt {
        let name = match Name::from_str(domain) {
            Ok(name) => name,
            Err(err) => return Attempt::Failed(err.into()),
        };

        let query = build_query(name, kind);
        let response = match self.exchange.send(&query, self.server).await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(err),
        };

        let rcode = response.response_code();
        if rcode != ResponseCode::NoError {
            debug!(%domain, %rcode, "non-success response code");
        }

        // The answer section counts even under an error response code: a
        // dangling alias answers NXDOMAIN with the CNAME record still present.
        let mut records = Vec::new();
        let mut ttl: Option<u32> = None;
        for record in response.answers() {
            if let Some(line) = kind.format(record.data()) {
                records.push(line);
                ttl = Some(ttl.map_or(record.ttl(), |current| current.min(record.ttl())));
            }
        }

        match ttl {
            Some(ttl) => Attempt::Answered { records, ttl },
            None => Attempt::NoAnswer,
        }
    }
}

impl<X: Exchange> Clone for Resolver<X> {
    fn clone(&self) -> Self {
        Self {
            exchange: self.exchange.clone(),
            cache: Arc::clone(&self.cache),
            server: self.server,
        }
    }
}

/// Build a recursive query with a fresh random ID and EDNS(0) advertising
/// a large UDP payload. No DNSSEC records are requested.
fn build_query(name: Name, kind: RecordKind) -> Message {
    let mut question = Query::new();
    question.set_name(name);
    question.set_query_type(kind.record_type());
    question.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(question);

    let mut edns = Edns::new();
    edns.set_max_payload(MAX_UDP_PAYLOAD);
    edns.set_version(0);
    *message.extensions_mut() = Some(edns);

    message
}

/// The ordered list of domains to query: the exact domain, then the base
/// domain for zone-apex kinds when it differs.
fn candidate_domains(domain: &str, kind: RecordKind) -> Vec<&str> {
    let mut candidates = vec![domain];
    if kind.tries_base_domain() {
        let base = base_domain(domain);
        if base != domain {
            candidates.push(base);
        }
    }
    candidates
}

/// Base (registrable-ish) domain: the last two labels when more exist,
/// otherwise the domain unchanged.
fn base_domain(domain: &str) -> &str {
    match domain.match_indices('.').rev().nth(1) {
        Some((dot, _)) => &domain[dot + 1..],
        None => domain,
    }
}
