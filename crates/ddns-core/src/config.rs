//! Configuration types for the DDNS updater
//!
//! The configuration is built once at startup (the `ddns-update` binary reads
//! it from the environment) and passed by reference into the components.
//! Nothing in the core reads ambient global state.

use serde::{Deserialize, Serialize};

/// Default IP-echo service
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// Default TransIP REST API base URL
pub const DEFAULT_TRANSIP_API_URL: &str = "https://api.transip.nl/v6";

/// Default token scope: a changing public IP cannot stay on a whitelist
pub const DEFAULT_GLOBAL_KEY: bool = true;

/// Default timeout for the IP-echo request (seconds)
pub const DEFAULT_IP_TIMEOUT_SECS: u64 = 10;

/// Default timeout for registrar API requests (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=300;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// IP source configuration
    pub ip_source: IpSourceConfig,

    /// Registrar configuration
    pub registrar: RegistrarConfig,

    /// The record to keep pointed at the public address
    pub target: RecordTarget,

    /// Live or dry-run
    #[serde(default)]
    pub mode: RunMode,
}

impl DdnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.registrar.validate()?;
        self.ip_source.validate()?;
        self.target.validate()?;
        Ok(())
    }
}

/// IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// URL of the IP-echo service
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_ip_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP source URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP source URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        validate_timeout("IP source timeout", self.timeout_secs)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_SOURCE_URL.to_string(),
            timeout_secs: DEFAULT_IP_TIMEOUT_SECS,
        }
    }
}

/// Registrar configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrarConfig {
    /// TransIP REST API
    Transip {
        /// Account login name
        account_name: String,
        /// Path to the PEM private key registered with the account
        private_key_path: String,
        /// API base URL
        #[serde(default = "default_transip_api_url")]
        api_url: String,
        /// Request a token usable from any IP instead of whitelisted ones only
        #[serde(default = "default_global_key")]
        global_key: bool,
        /// Request timeout in seconds
        #[serde(default = "default_api_timeout_secs")]
        timeout_secs: u64,
    },
}

impl RegistrarConfig {
    /// A TransIP configuration with default endpoint and timeout
    pub fn transip(account_name: impl Into<String>, private_key_path: impl Into<String>) -> Self {
        RegistrarConfig::Transip {
            account_name: account_name.into(),
            private_key_path: private_key_path.into(),
            api_url: default_transip_api_url(),
            global_key: DEFAULT_GLOBAL_KEY,
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }

    /// Validate the registrar configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistrarConfig::Transip {
                account_name,
                private_key_path,
                api_url,
                timeout_secs,
                ..
            } => {
                if account_name.is_empty() || private_key_path.is_empty() {
                    return Err(crate::Error::config(
                        "TRANSIP_ACCOUNT_NAME and TRANSIP_PRIVATE_KEY_PATH environment variables must be set.",
                    ));
                }
                if api_url.is_empty() {
                    return Err(crate::Error::config("TransIP API URL cannot be empty"));
                }
                if !api_url.starts_with("https://") && !api_url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "TransIP API URL must use HTTP or HTTPS scheme. Got: {}",
                        api_url
                    )));
                }
                validate_timeout("Registrar timeout", *timeout_secs)
            }
        }
    }

    /// Get the registrar type name
    pub fn type_name(&self) -> &str {
        match self {
            RegistrarConfig::Transip { .. } => "transip",
        }
    }
}

/// The domain and record label being maintained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTarget {
    /// Domain whose DNS entries are managed (e.g. "example.com")
    pub domain: String,

    /// Record label within the domain (e.g. "home"); used verbatim
    pub subdomain: String,
}

impl RecordTarget {
    pub fn new(domain: impl Into<String>, subdomain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
        }
    }

    /// Validate the target
    ///
    /// The subdomain is not checked: registrars differ in how they spell the
    /// apex record and whatever the operator configured is matched exactly.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("Domain name cannot be empty"));
        }
        Ok(())
    }
}

/// Whether writes are actually sent to the registrar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Perform updates
    #[default]
    Live,
    /// Perform reads, log intended writes, skip them
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

impl std::str::FromStr for RunMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(crate::Error::config(format!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ))),
        }
    }
}

fn validate_timeout(what: &str, secs: u64) -> Result<(), crate::Error> {
    if !TIMEOUT_RANGE_SECS.contains(&secs) {
        return Err(crate::Error::config(format!(
            "{} must be between 1 and 300 seconds. Got: {}",
            what, secs
        )));
    }
    Ok(())
}

fn default_ip_timeout_secs() -> u64 {
    DEFAULT_IP_TIMEOUT_SECS
}

fn default_api_timeout_secs() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_global_key() -> bool {
    DEFAULT_GLOBAL_KEY
}

fn default_transip_api_url() -> String {
    DEFAULT_TRANSIP_API_URL.to_string()
}
