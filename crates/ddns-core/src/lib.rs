// # ddns-core
//
// Core library for the run-once DDNS updater.
//
// ## Architecture Overview
//
// One invocation of the updater performs a single reconciliation pass:
// - **IpSource**: Trait for resolving the caller's public IPv4 address
// - **DnsRegistrar**: Trait for listing, updating and creating DNS entries
// - **Reconciler**: Decides between no-op, update and create for one record
// - **DdnsEngine**: Resolves the address once and hands it to the Reconciler
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decision logic lives here, I/O lives in plugin crates
// 2. **Run Once**: No background tasks, no retry loops, the scheduler re-invokes us
// 3. **Idempotency**: An unchanged address never produces a write
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, IpSourceConfig, RecordTarget, RegistrarConfig, RunMode};
pub use engine::{DdnsEngine, ReconcileOutcome, Reconciler, find_a_record};
pub use error::{Error, Result, WriteOperation};
pub use record::{A_RECORD, DEFAULT_NEW_RECORD_TTL, DnsEntry, PublicAddress};
pub use traits::{DnsRegistrar, IpSource};
