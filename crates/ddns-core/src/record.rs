//! DNS record and address types
//!
//! These are transient representations of registrar data. The registrar is
//! the source of truth; nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record type this updater manages
pub const A_RECORD: &str = "A";

/// TTL (seconds) given to records this updater creates
///
/// Existing records keep whatever TTL the registrar stored.
pub const DEFAULT_NEW_RECORD_TTL: u32 = 300;

/// The caller's public address as reported by an IP-echo service
///
/// Opaque: the value is compared byte-for-byte with record content and
/// written as-is, so no trimming or parsing happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicAddress(String);

impl PublicAddress {
    /// Wrap an address exactly as observed
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single DNS entry belonging to a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    /// Record label relative to the domain (e.g. "home", "@")
    pub name: String,

    /// TTL in seconds
    pub expire: u32,

    /// Record type (e.g. "A", "AAAA", "CNAME")
    #[serde(rename = "type")]
    pub entry_type: String,

    /// Record value
    pub content: String,
}

impl DnsEntry {
    /// Create a new entry
    pub fn new(
        name: impl Into<String>,
        expire: u32,
        entry_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expire,
            entry_type: entry_type.into(),
            content: content.into(),
        }
    }

    /// A fresh A record pointing `name` at `ip` with the default TTL
    pub fn new_a_record(name: impl Into<String>, ip: &PublicAddress) -> Self {
        Self::new(name, DEFAULT_NEW_RECORD_TTL, A_RECORD, ip.as_str())
    }

    /// Whether this is the A record named `name`
    pub fn is_a_record_named(&self, name: &str) -> bool {
        self.entry_type == A_RECORD && self.name == name
    }
}
