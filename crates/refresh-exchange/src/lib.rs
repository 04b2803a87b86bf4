//! Exchange access for the order refresher.
//!
//! # Key Components
//!
//! - [`ExchangeClient`]: the calls the refresher needs, behind a trait
//! - [`RestClient`]: signed REST implementation
//! - [`RequestSigner`]: HMAC-SHA512 URL signing
//! - [`NonceManager`]: strictly increasing request nonces
//! - [`MockExchange`]: scripted client for tests

pub mod api;
pub mod client;
pub mod error;
pub mod mock;
pub mod nonce;
pub mod signer;

pub use api::{ApiResponse, BoxFuture, DynExchangeClient, ExchangeClient, LimitOrderRequest};
pub use client::{ClientConfig, RestClient};
pub use error::{ExchangeError, ExchangeResult};
pub use mock::{ExchangeCall, MockExchange, StatusReply};
pub use nonce::{Clock, NonceManager, SystemClock};
pub use signer::{sign_message, Credentials, RequestSigner, SignedRequest};
