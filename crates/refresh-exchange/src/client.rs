//! HTTP client for the exchange's v1.1 REST API.
//!
//! Only the handful of signed calls the refresher needs are implemented:
//! open orders, cancel, single-order lookup, buy/sell limit, and balance.

use std::time::Duration;

use refresh_core::{Balance, Order};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::api::{ApiResponse, BoxFuture, ExchangeClient, LimitOrderRequest, PlacedOrder};
use crate::error::{ExchangeError, ExchangeResult};
use crate::nonce::NonceManager;
use crate::signer::{Credentials, RequestSigner, SIGNATURE_HEADER};

/// Connection settings for the REST client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout (seconds). Default: 15.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://bittrex.com/api/v1.1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Signed REST client.
pub struct RestClient {
    http: Client,
    base_url: String,
    signer: RequestSigner,
}

impl RestClient {
    /// Create a new client. Fails if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, credentials: Credentials) -> ExchangeResult<Self> {
        if !credentials.is_complete() {
            return Err(ExchangeError::Config(
                "credentials.key and credentials.secret are required".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ExchangeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            signer: RequestSigner::new(credentials, NonceManager::with_system_clock()),
        })
    }

    /// Signed GET returning the decoded envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<ApiResponse<T>> {
        let request = self.signer.sign(&self.base_url, path, params)?;
        trace!(path, "Sending signed request");

        let response = self
            .http
            .get(request.url)
            .header(SIGNATURE_HEADER, request.signature)
            .send()
            .await
            .map_err(|e| ExchangeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Http(format!("Failed to read body: {e}")))?;

        serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(format!("{path}: {e}")))
    }

    async fn place(&self, path: &'static str, request: LimitOrderRequest) -> ExchangeResult<Uuid> {
        let params = [
            ("market", request.market),
            ("quantity", request.quantity.to_string()),
            ("rate", request.rate.to_string()),
        ];
        let placed: PlacedOrder = self.get(path, &params).await?.require_result(path)?;
        debug!(path, uuid = %placed.uuid, "Limit order placed");
        Ok(placed.uuid)
    }
}

impl ExchangeClient for RestClient {
    fn open_orders(&self) -> BoxFuture<'_, ExchangeResult<Vec<Order>>> {
        Box::pin(async move {
            self.get("market/getopenorders", &[])
                .await?
                .require_result("market/getopenorders")
        })
    }

    fn cancel(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            self.get::<serde_json::Value>("market/cancel", &[("uuid", uuid.to_string())])
                .await?
                .into_result()
                .map(|_| ())
        })
    }

    fn order(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<Order>> {
        Box::pin(async move {
            self.get("account/getorder", &[("uuid", uuid.to_string())])
                .await?
                .require_result("account/getorder")
        })
    }

    fn buy_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        Box::pin(self.place("market/buylimit", request))
    }

    fn sell_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        Box::pin(self.place("market/selllimit", request))
    }

    fn balance(&self, currency: String) -> BoxFuture<'_, ExchangeResult<Balance>> {
        Box::pin(async move {
            self.get("account/getbalance", &[("currency", currency)])
                .await?
                .require_result("account/getbalance")
        })
    }
}
