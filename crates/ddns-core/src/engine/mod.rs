//! Core DDNS engine
//!
//! The engine performs exactly one reconciliation pass per invocation:
//! - Resolving the public address via IpSource
//! - Listing the domain's entries via DnsRegistrar
//! - Deciding between no-op, update and create
//! - Issuing at most one mutating registrar call
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  PublicAddress  ┌──────────────┐  list / update / add  ┌──────────────┐
//! │  IpSource   │────────────────▶│  Reconciler  │──────────────────────▶│ DnsRegistrar │
//! └─────────────┘                 └──────────────┘                       └──────────────┘
//! ```
//!
//! ## Failure Policy
//!
//! Every error is terminal for the run. A failed lookup means the registrar
//! is never contacted; a failed listing means nothing is written. Retrying
//! is left to whatever schedules the next invocation.

use crate::config::RecordTarget;
use crate::error::{Error, Result, WriteOperation};
use crate::record::{DnsEntry, PublicAddress};
use crate::traits::{DnsRegistrar, IpSource};
use tracing::{debug, info};

/// What a reconciliation pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The A record already pointed at the address; nothing was written
    Unchanged {
        /// The matching entry as listed
        entry: DnsEntry,
    },

    /// The A record existed with other content and was updated
    Updated {
        /// The entry as listed
        previous: DnsEntry,
        /// The entry as sent to the registrar
        current: DnsEntry,
    },

    /// No A record existed and one was created
    Created {
        /// The entry as sent to the registrar
        entry: DnsEntry,
    },
}

impl ReconcileOutcome {
    /// Whether a mutating call was issued
    pub fn wrote(&self) -> bool {
        !matches!(self, ReconcileOutcome::Unchanged { .. })
    }
}

/// Find the A record named `subdomain`
///
/// Scans in listing order and stops at the first entry with type "A" and an
/// exactly equal name. Duplicates further down are ignored.
pub fn find_a_record<'a>(entries: &'a [DnsEntry], subdomain: &str) -> Option<&'a DnsEntry> {
    entries.iter().find(|entry| entry.is_a_record_named(subdomain))
}

/// Brings one A record in line with a public address
pub struct Reconciler<'a> {
    registrar: &'a dyn DnsRegistrar,
}

impl<'a> Reconciler<'a> {
    pub fn new(registrar: &'a dyn DnsRegistrar) -> Self {
        Self { registrar }
    }

    /// Reconcile the A record `subdomain` of `domain` with `ip`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileOutcome)`: What was done
    /// - `Err(Error::RegistrarRead)`: Listing failed, nothing was written
    /// - `Err(Error::RegistrarWrite)`: The update or create call failed
    pub async fn reconcile(
        &self,
        domain: &str,
        subdomain: &str,
        ip: &PublicAddress,
    ) -> Result<ReconcileOutcome> {
        let entries = self
            .registrar
            .list_entries(domain)
            .await
            .map_err(|e| Error::registrar_read(domain, e))?;

        debug!(
            "Listed {} DNS entries for {} via {}",
            entries.len(),
            domain,
            self.registrar.registrar_name()
        );

        match find_a_record(&entries, subdomain) {
            Some(existing) => {
                info!(
                    "Found existing A record for {}.{}: {} (TTL: {})",
                    subdomain, domain, existing.content, existing.expire
                );

                if existing.content == ip.as_str() {
                    info!(
                        "A record for {}.{} is already set to {}. No update needed.",
                        subdomain, domain, ip
                    );
                    return Ok(ReconcileOutcome::Unchanged {
                        entry: existing.clone(),
                    });
                }

                let mut updated = existing.clone();
                updated.content = ip.as_str().to_string();

                self.registrar
                    .update_entry(domain, &updated)
                    .await
                    .map_err(|e| {
                        Error::registrar_write(WriteOperation::Update, domain, subdomain, ip.as_str(), e)
                    })?;

                info!(
                    "Successfully updated A record for {}.{} from {} to {}",
                    subdomain, domain, existing.content, ip
                );
                Ok(ReconcileOutcome::Updated {
                    previous: existing.clone(),
                    current: updated,
                })
            }
            None => {
                let entry = DnsEntry::new_a_record(subdomain, ip);

                self.registrar.add_entry(domain, &entry).await.map_err(|e| {
                    Error::registrar_write(WriteOperation::Create, domain, subdomain, ip.as_str(), e)
                })?;

                info!(
                    "Successfully added new A record for {}.{} to {} (TTL: {})",
                    subdomain, domain, ip, entry.expire
                );
                Ok(ReconcileOutcome::Created { entry })
            }
        }
    }
}

/// Core DDNS engine
///
/// Owns one IP source, one registrar and the record target. Construct it,
/// call [`DdnsEngine::run_once`], then drop it.
pub struct DdnsEngine {
    /// IP source for resolving the public address
    ip_source: Box<dyn IpSource>,

    /// Registrar holding the DNS entries
    registrar: Box<dyn DnsRegistrar>,

    /// Record to maintain
    target: RecordTarget,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `registrar`: Registrar implementation
    /// - `target`: The domain and record label to maintain
    pub fn new(
        ip_source: Box<dyn IpSource>,
        registrar: Box<dyn DnsRegistrar>,
        target: RecordTarget,
    ) -> Result<Self> {
        target.validate()?;

        Ok(Self {
            ip_source,
            registrar,
            target,
        })
    }

    /// Resolve the public address and reconcile the record once
    ///
    /// If the address cannot be resolved the registrar is not contacted.
    pub async fn run_once(&self) -> Result<ReconcileOutcome> {
        let ip = self.ip_source.current().await?;
        info!(
            "Current public IPv4 address: {} (via {})",
            ip,
            self.ip_source.source_name()
        );

        Reconciler::new(self.registrar.as_ref())
            .reconcile(&self.target.domain, &self.target.subdomain, &ip)
            .await
    }
}
