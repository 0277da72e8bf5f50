//! Supported record kinds and answer formatting.
//!
//! `RecordKind` is a closed enumeration: every kind carries its wire type,
//! its formatter, and its fallback behavior in exhaustive matches, so adding
//! a kind without extending all of them fails to compile.

use std::fmt;
use std::str::FromStr;

use hickory_proto::rr::{RData, RecordType};

use crate::error::Error;

/// The record types a lookup may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
}

impl RecordKind {
    /// Canonical upper-case token, as used in queries and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
        }
    }

    /// Wire record type for query construction.
    pub const fn record_type(self) -> RecordType {
        match self {
            Self::A => RecordType::A,
            Self::Aaaa => RecordType::AAAA,
            Self::Cname => RecordType::CNAME,
            Self::Mx => RecordType::MX,
            Self::Ns => RecordType::NS,
        }
    }

    /// Whether a miss at the exact name retries at the base domain.
    ///
    /// MX and NS are commonly published at the zone apex, so a lookup for
    /// `mail.example.com` also tries `example.com`.
    pub const fn tries_base_domain(self) -> bool {
        matches!(self, Self::Mx | Self::Ns)
    }

    /// Format answer data of this kind into its result line.
    ///
    /// Returns `None` when the data belongs to a different record type,
    /// which callers use to skip non-matching answers.
    pub fn format(self, data: &RData) -> Option<String> {
        match self {
            Self::A => match data {
                RData::A(ip) => Some(format!("A Record: {ip}")),
                _ => None,
            },
            Self::Aaaa => match data {
                RData::AAAA(ip) => Some(format!("AAAA Record: {ip}")),
                _ => None,
            },
            Self::Cname => match data {
                RData::CNAME(target) => Some(format!("CNAME Record: {target}")),
                _ => None,
            },
            Self::Mx => match data {
                RData::MX(mx) => Some(format!(
                    "MX Record: {} (Preference: {})",
                    mx.exchange(),
                    mx.preference()
                )),
                _ => None,
            },
            Self::Ns => match data {
                RData::NS(target) => Some(format!("NS Record: {target}")),
                _ => None,
            },
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();
        match normalized.as_str() {
            "A" => Ok(Self::A),
            "AAAA" => Ok(Self::Aaaa),
            "CNAME" => Ok(Self::Cname),
            "MX" => Ok(Self::Mx),
            "NS" => Ok(Self::Ns),
            _ => Err(Error::UnsupportedType(normalized)),
        }
    }
}
