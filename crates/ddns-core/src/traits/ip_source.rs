// # IP Source Trait
//
// Defines the interface for resolving the caller's public address.
//
// ## Implementations
//
// - HTTP echo service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.current().await?;
//     println!("Public address: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::PublicAddress;

/// Trait for IP source implementations
///
/// Anything that can produce a [`PublicAddress`] or fail. The engine calls
/// [`IpSource::current`] exactly once per run, so implementations should
/// perform a single lookup and leave retry decisions to whoever schedules
/// the next run.
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(PublicAddress)`: The address exactly as observed
    /// - `Err(Error::Resolution)`: If the address could not be determined
    async fn current(&self) -> Result<PublicAddress, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
