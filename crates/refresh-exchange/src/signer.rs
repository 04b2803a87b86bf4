//! Request signing.
//!
//! Every authenticated call is a GET whose query starts with
//! `apikey=<key>&nonce=<n>`, followed by the call's own parameters. The full
//! URL is signed with HMAC-SHA512 over the API secret and the hex digest is
//! sent in the `apisign` header.

use std::fmt;

use hmac::{Hmac, Mac};
use reqwest::Url;
use serde::Deserialize;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ExchangeError, ExchangeResult};
use crate::nonce::NonceManager;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "apisign";

/// API key pair. Wiped from memory on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.key.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A URL ready to send, with its signature.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub url: Url,
    pub signature: String,
}

/// Builds and signs request URLs.
pub struct RequestSigner {
    credentials: Credentials,
    nonce: NonceManager,
}

impl RequestSigner {
    pub fn new(credentials: Credentials, nonce: NonceManager) -> Self {
        Self { credentials, nonce }
    }

    /// Build `{base_url}/{path}?apikey=..&nonce=..&<params>` and sign it.
    pub fn sign(
        &self,
        base_url: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<SignedRequest> {
        let raw = format!("{}/{}", base_url.trim_end_matches('/'), path);
        let mut url =
            Url::parse(&raw).map_err(|e| ExchangeError::InvalidUrl(format!("{raw}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("apikey", &self.credentials.key);
            query.append_pair("nonce", &self.nonce.next().to_string());
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }

        let signature = sign_message(&self.credentials.secret, url.as_str());
        Ok(SignedRequest { url, signature })
    }
}

/// Hex-encoded HMAC-SHA512 of `message` under `secret`.
pub fn sign_message(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
