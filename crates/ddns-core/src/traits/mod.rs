//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Resolve the caller's public address
//! - [`DnsRegistrar`]: List, update and create DNS entries via a registrar API

pub mod dns_registrar;
pub mod ip_source;

pub use dns_registrar::DnsRegistrar;
pub use ip_source::IpSource;
