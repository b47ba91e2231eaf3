//! Test doubles and common utilities for reconciliation contract tests
//!
//! These doubles record every call so tests can assert exactly which
//! registrar operations a run issued.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::{DnsEntry, DnsRegistrar, IpSource, PublicAddress};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource returning a fixed address or a fixed failure
pub struct StaticIpSource {
    result: std::result::Result<String, String>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn ok(ip: &str) -> Self {
        Self {
            result: Ok(ip.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticIpSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            result: other.result.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<PublicAddress> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(ip) => Ok(PublicAddress::new(ip.clone())),
            Err(message) => Err(Error::resolution(message.clone())),
        }
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// A single recorded registrar call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarCall {
    List { domain: String },
    Update { domain: String, entry: DnsEntry },
    Add { domain: String, entry: DnsEntry },
}

/// Which registrar operation should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    List,
    Update,
    Add,
}

/// A registrar serving a fixed listing and recording every call
pub struct MockRegistrar {
    entries: Vec<DnsEntry>,
    fail_on: FailOn,
    calls: Arc<Mutex<Vec<RegistrarCall>>>,
}

impl MockRegistrar {
    pub fn new(entries: Vec<DnsEntry>) -> Self {
        Self {
            entries,
            fail_on: FailOn::Nothing,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, fail_on: FailOn) -> Self {
        self.fail_on = fail_on;
        self
    }

    /// Create a new MockRegistrar that shares the call log with an existing one
    pub fn sharing_calls_with(other: &Self) -> Self {
        Self {
            entries: other.entries.clone(),
            fail_on: other.fail_on,
            calls: Arc::clone(&other.calls),
        }
    }

    /// Every call issued so far, in order
    pub fn calls(&self) -> Vec<RegistrarCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Update and add calls only
    pub fn write_calls(&self) -> Vec<RegistrarCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, RegistrarCall::List { .. }))
            .collect()
    }

    fn record(&self, call: RegistrarCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsRegistrar for MockRegistrar {
    async fn list_entries(&self, domain: &str) -> Result<Vec<DnsEntry>> {
        self.record(RegistrarCall::List {
            domain: domain.to_string(),
        });
        if self.fail_on == FailOn::List {
            return Err(Error::auth("invalid signature"));
        }
        Ok(self.entries.clone())
    }

    async fn update_entry(&self, domain: &str, entry: &DnsEntry) -> Result<()> {
        self.record(RegistrarCall::Update {
            domain: domain.to_string(),
            entry: entry.clone(),
        });
        if self.fail_on == FailOn::Update {
            return Err(Error::provider("mock", "update rejected"));
        }
        Ok(())
    }

    async fn add_entry(&self, domain: &str, entry: &DnsEntry) -> Result<()> {
        self.record(RegistrarCall::Add {
            domain: domain.to_string(),
            entry: entry.clone(),
        });
        if self.fail_on == FailOn::Add {
            return Err(Error::provider("mock", "add rejected"));
        }
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "mock"
    }
}

/// Shorthand for building listings
pub fn entry(name: &str, entry_type: &str, content: &str, expire: u32) -> DnsEntry {
    DnsEntry::new(name, expire, entry_type, content)
}
