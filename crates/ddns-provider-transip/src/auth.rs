//! TransIP access-token handshake
//!
//! TransIP issues short-lived bearer tokens in exchange for a request body
//! signed with the account's RSA private key:
//!
//! ```http
//! POST /auth
//! Signature: base64(RSA-PKCS1v15-SHA512(body))
//!
//! {"login":"alice","nonce":"...","read_only":false,"expiration_time":"30 minutes",
//!  "label":"ddns-1700000000","global_key":true}
//! ```
//!
//! The signature covers the exact bytes sent, so the body is serialized once
//! and those bytes are both signed and transmitted.

use ddns_core::{Error, Result};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha512;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use serde::{Deserialize, Serialize};

/// Lifetime requested for access tokens; one run needs a few seconds at most
pub(crate) const TOKEN_EXPIRATION: &str = "30 minutes";

const NONCE_LEN: usize = 16;

/// Signs token requests with an account's private key
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the key.
pub struct RequestSigner {
    key: SigningKey<Sha512>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key", &"<REDACTED>")
            .finish()
    }
}

impl RequestSigner {
    /// Wrap an already parsed key
    pub fn new(key: RsaPrivateKey) -> Self {
        Self {
            key: SigningKey::<Sha512>::new(key),
        }
    }

    /// Parse a PEM key (PKCS#8 as issued by the TransIP control panel, or PKCS#1)
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::config(format!("Invalid TransIP private key: {}", e)))?;
        Ok(Self::new(key))
    }

    /// Read and parse a PEM key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read TransIP private key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_pem(&pem)
    }

    /// Base64 signature over `body`, as expected in the `Signature` header
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        let signature = self
            .key
            .try_sign_with_rng(&mut rand::thread_rng(), body)
            .map_err(|e| Error::auth(format!("Failed to sign token request: {}", e)))?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }
}

/// Body of `POST /auth`
#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub login: &'a str,
    pub nonce: String,
    pub read_only: bool,
    pub expiration_time: &'a str,
    pub label: String,
    pub global_key: bool,
}

impl<'a> TokenRequest<'a> {
    pub fn new(login: &'a str, read_only: bool, global_key: bool) -> Self {
        Self {
            login,
            nonce: nonce(),
            read_only,
            expiration_time: TOKEN_EXPIRATION,
            label: format!("ddns-{}", chrono::Utc::now().timestamp()),
            global_key,
        }
    }
}

/// Response of `POST /auth`
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}
