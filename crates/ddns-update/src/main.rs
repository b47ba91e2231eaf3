// # ddns-update - run-once DDNS updater
//
// Thin integration layer: everything that decides anything lives in ddns-core.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP source and the TransIP registrar into the engine
// 4. Running one reconciliation pass and exiting
//
// Schedule it (cron, systemd timer) to keep the record current; a failed run
// is simply retried by the next invocation.
//
// ## Configuration
//
// ### Registrar
// - `TRANSIP_ACCOUNT_NAME`: TransIP login (required)
// - `TRANSIP_PRIVATE_KEY_PATH`: Path to the PEM private key (required)
// - `TRANSIP_GLOBAL_KEY`: Request a token usable from any IP (default: true;
//   set to false for whitelist-bound tokens)
// - `TRANSIP_API_URL`: API base URL (default: https://api.transip.nl/v6)
// - `DDNS_API_TIMEOUT_SECS`: Registrar request timeout (default: 30)
//
// ### Record
// - `DOMAIN`: Domain whose DNS entries are managed (required)
// - `SUBDOMAIN`: Record label, used verbatim (required; "@" for the apex)
//
// ### IP Source
// - `DDNS_IP_SOURCE_URL`: IP-echo URL (default: https://api.ipify.org)
// - `DDNS_IP_TIMEOUT_SECS`: IP-echo request timeout (default: 10)
//
// ### Behaviour
// - `DDNS_MODE`: live or dry-run (default: live)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export TRANSIP_ACCOUNT_NAME=alice
// export TRANSIP_PRIVATE_KEY_PATH=/etc/ddns/transip.key
// export DOMAIN=example.com
// export SUBDOMAIN=home
//
// ddns-update
// ```

use anyhow::Result;
use ddns_core::config::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_GLOBAL_KEY, DEFAULT_IP_SOURCE_URL, DEFAULT_IP_TIMEOUT_SECS,
    DEFAULT_TRANSIP_API_URL,
};
use ddns_core::{
    DdnsConfig, DdnsEngine, IpSourceConfig, ReconcileOutcome, RecordTarget, RegistrarConfig,
    RunMode,
};
use ddns_ip_http::HttpIpSource;
use ddns_provider_transip::TransipRegistrar;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Build the configuration from a variable lookup (`env::var` in production)
fn config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ddns_core::Result<DdnsConfig> {
    let required = |name: &str| -> ddns_core::Result<String> {
        lookup(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ddns_core::Error::config(format!("{} must be set", name)))
    };

    let account_name = lookup("TRANSIP_ACCOUNT_NAME").unwrap_or_default();
    let private_key_path = lookup("TRANSIP_PRIVATE_KEY_PATH").unwrap_or_default();
    if account_name.is_empty() || private_key_path.is_empty() {
        return Err(ddns_core::Error::config(
            "TRANSIP_ACCOUNT_NAME and TRANSIP_PRIVATE_KEY_PATH environment variables must be set.",
        ));
    }

    let domain = required("DOMAIN")?;
    // An empty SUBDOMAIN is a deliberate choice, an unset one is not
    let subdomain = lookup("SUBDOMAIN")
        .ok_or_else(|| ddns_core::Error::config("SUBDOMAIN must be set"))?;

    let config = DdnsConfig {
        ip_source: IpSourceConfig {
            url: lookup("DDNS_IP_SOURCE_URL").unwrap_or_else(|| DEFAULT_IP_SOURCE_URL.to_string()),
            timeout_secs: parse_or(&lookup, "DDNS_IP_TIMEOUT_SECS", DEFAULT_IP_TIMEOUT_SECS)?,
        },
        registrar: RegistrarConfig::Transip {
            account_name,
            private_key_path,
            api_url: lookup("TRANSIP_API_URL")
                .unwrap_or_else(|| DEFAULT_TRANSIP_API_URL.to_string()),
            global_key: parse_or(&lookup, "TRANSIP_GLOBAL_KEY", DEFAULT_GLOBAL_KEY)?,
            timeout_secs: parse_or(&lookup, "DDNS_API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS)?,
        },
        target: RecordTarget::new(domain, subdomain),
        mode: match lookup("DDNS_MODE") {
            Some(mode) => mode.parse()?,
            None => RunMode::Live,
        },
    };

    config.validate()?;
    Ok(config)
}

/// Parse an optional variable, falling back to `default` when unset
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> ddns_core::Result<T> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            ddns_core::Error::config(format!("{} has an invalid value: '{}'", name, raw))
        }),
    }
}

fn parse_log_level(raw: Option<String>) -> std::result::Result<Level, String> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("info") => Ok(Level::INFO),
        Some("trace") => Ok(Level::TRACE),
        Some("debug") => Ok(Level::DEBUG),
        Some("warn") => Ok(Level::WARN),
        Some("error") => Ok(Level::ERROR),
        Some(other) => Err(format!(
            "DDNS_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            other
        )),
    }
}

fn main() -> ExitCode {
    // Logging comes first so configuration errors are reported like any other
    let level = parse_log_level(env::var("DDNS_LOG_LEVEL").ok());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(*level.as_ref().unwrap_or(&Level::INFO))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = level {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match config_from_lookup(|name| env::var(name).ok()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // One pass, no background work: a current-thread runtime is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(config)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Wire the components together and run a single reconciliation pass
async fn run(config: DdnsConfig) -> Result<ReconcileOutcome> {
    info!(
        "Updating A record {}.{} via {} [mode: {:?}]",
        config.target.subdomain,
        config.target.domain,
        config.registrar.type_name(),
        config.mode
    );

    let ip_source = HttpIpSource::from_config(&config.ip_source)?;
    let registrar = TransipRegistrar::from_config(&config.registrar, config.mode)?;
    let engine = DdnsEngine::new(Box::new(ip_source), Box::new(registrar), config.target)?;

    let outcome = engine.run_once().await?;
    match &outcome {
        ReconcileOutcome::Unchanged { entry } => {
            info!("Outcome: no-op ({} already points at {})", entry.name, entry.content)
        }
        ReconcileOutcome::Updated { previous, current } => info!(
            "Outcome: updated {} from {} to {}",
            current.name, previous.content, current.content
        ),
        ReconcileOutcome::Created { entry } => info!(
            "Outcome: created {} -> {} (TTL: {})",
            entry.name, entry.content, entry.expire
        ),
    }

    Ok(outcome)
}
