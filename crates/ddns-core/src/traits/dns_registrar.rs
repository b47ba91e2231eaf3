// # DNS Registrar Trait
//
// Defines the interface to a domain registrar's DNS management API.
//
// ## Implementations
//
// - TransIP: `ddns-provider-transip` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsEntry, DnsRegistrar};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let registrar = /* DnsRegistrar implementation */;
//
//     let entries = registrar.list_entries("example.com").await?;
//     for entry in &entries {
//         println!("{} {} {}", entry.name, entry.entry_type, entry.content);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::DnsEntry;

/// Trait for DNS registrar implementations
///
/// The three operations map one-to-one onto registrar API calls. Deciding
/// which of them to issue is the job of [`crate::Reconciler`]; a registrar
/// only executes what it is asked to.
///
/// # Constraints
///
/// - One API call per method invocation (authentication handshakes aside)
/// - No retry logic or backoff; return the error
/// - No caching of entries between calls
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsRegistrar: Send + Sync {
    /// List every DNS entry configured for `domain`
    ///
    /// Entries are returned in the order the registrar reports them.
    async fn list_entries(&self, domain: &str) -> Result<Vec<DnsEntry>, crate::Error>;

    /// Replace an existing entry
    ///
    /// The registrar identifies the entry by name, type and expire; only the
    /// content is expected to differ from what it stores.
    async fn update_entry(&self, domain: &str, entry: &DnsEntry) -> Result<(), crate::Error>;

    /// Add a new entry
    async fn add_entry(&self, domain: &str, entry: &DnsEntry) -> Result<(), crate::Error>;

    /// Get the registrar name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the registrar (e.g., "transip")
    fn registrar_name(&self) -> &'static str;
}
