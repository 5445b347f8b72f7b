//! # Payment gateway
//!
//! Thin client for the PayOS hosted-checkout API.
//!
//! A payment link is created with a single POST carrying the order data and an
//! HMAC-SHA256 signature over the canonical
//! `amount/cancelUrl/description/orderCode/returnUrl` string, keyed by the
//! merchant checksum key. The gateway answers with an envelope whose `code`
//! is `"00"` on success and whose `data` carries the hosted checkout url the
//! customer is sent to.
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::PayOsConfig;

type HmacSha256 = Hmac<Sha256>;

const PAYMENT_REQUESTS_PATH: &str = "/v2/payment-requests";

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway rejected request: {0} {1}")]
    Rejected(String, String),

    #[error("gateway response missing checkout data")]
    MissingData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub name: String,
    pub quantity: u32,
    pub price: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub order_code: i64,
    pub amount: i64,
    pub description: String,
    pub return_url: String,
    pub cancel_url: String,
    pub items: Vec<ItemData>,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponseData {
    pub checkout_url: String,
}

#[derive(Deserialize)]
struct GatewayEnvelope {
    code: String,
    desc: String,
    data: Option<CheckoutResponseData>,
}

pub struct PayOsClient {
    http: Client,
    config: PayOsConfig,
}

impl PayOsClient {
    pub fn new(config: PayOsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Builds the signed request body for one order. The return and cancel
    /// urls are the payment routes of this server, reached from `base_url`.
    pub fn payment_data(
        &self,
        order_code: i64,
        amount: i64,
        description: &str,
        base_url: &str,
    ) -> PaymentData {
        let return_url = format!("{base_url}/customer/payment/success");
        let cancel_url = format!("{base_url}/customer/payment/cancel");
        let signature = self.sign(&canonical(
            amount,
            &cancel_url,
            description,
            order_code,
            &return_url,
        ));

        PaymentData {
            order_code,
            amount,
            description: description.to_string(),
            return_url,
            cancel_url,
            items: vec![ItemData {
                name: format!("Your order code: {order_code}"),
                quantity: 1,
                price: amount,
            }],
            signature,
        }
    }

    pub async fn create_payment_link(
        &self,
        data: &PaymentData,
    ) -> Result<CheckoutResponseData, PaymentError> {
        let response = self
            .http
            .post(format!("{}{}", self.config.base_url, PAYMENT_REQUESTS_PATH))
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .json(data)
            .send()
            .await?;

        let envelope: GatewayEnvelope = response.json().await?;
        if envelope.code != "00" {
            return Err(PaymentError::Rejected(envelope.code, envelope.desc));
        }

        envelope.data.ok_or(PaymentError::MissingData)
    }

    fn sign(&self, payload: &str) -> String {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(self.config.checksum_key.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        hex_digest(&mac.finalize().into_bytes())
    }
}

fn canonical(
    amount: i64,
    cancel_url: &str,
    description: &str,
    order_code: i64,
    return_url: &str,
) -> String {
    format!(
        "amount={amount}&cancelUrl={cancel_url}&description={description}&orderCode={order_code}&returnUrl={return_url}"
    )
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
