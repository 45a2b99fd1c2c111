use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::Config, error::HttpError};

/// Attempts for payment intent creation. Retrying an intent creation is safe
/// because every attempt carries the same idempotency key; confirmations and
/// lookups are never retried here.
const CREATE_INTENT_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 200;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider error: {0}")]
    Api(String),

    #[error("payment provider response missing field `{0}`")]
    MalformedResponse(&'static str),
}

impl From<PaymentError> for HttpError {
    fn from(error: PaymentError) -> Self {
        HttpError::server_error(error.to_string())
    }
}

/// Metadata echoed onto every intent so both finalizers can bind a processor
/// charge back to its booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub client_secret: Option<String>,
    pub payment_method_types: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    pub fn booking_id(&self) -> Option<&str> {
        self.metadata.get("booking_id").map(String::as_str)
    }
}

pub struct PaymentGatewayService {
    secret_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl PaymentGatewayService {
    /// Returns `None` when the processor secret key is absent, degrading the
    /// payment endpoints to a configured "unavailable" error.
    pub fn from_config(config: &Config) -> Option<Self> {
        let secret_key = config.payment_secret_key.clone()?;
        Some(Self {
            secret_key,
            api_base: config.payment_api_base.clone(),
            client: reqwest::Client::new(),
        })
    }

    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        metadata: &IntentMetadata,
        description: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let idempotency_key = Uuid::new_v4().to_string();
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("description", description.to_string()),
            ("metadata[booking_id]", metadata.booking_id.to_string()),
            ("metadata[customer_id]", metadata.customer_id.to_string()),
            ("metadata[provider_id]", metadata.provider_id.to_string()),
        ];

        let mut last_error: Option<PaymentError> = None;
        for attempt in 0..CREATE_INTENT_ATTEMPTS {
            if attempt > 0 {
                let jitter = rand::thread_rng().gen_range(0..RETRY_BASE_DELAY_MS);
                let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1) + jitter;
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tracing::warn!(attempt, "retrying payment intent creation");
            }

            let response = self
                .client
                .post(format!("{}/v1/payment_intents", self.api_base))
                .bearer_auth(&self.secret_key)
                .header("Idempotency-Key", &idempotency_key)
                .form(&params)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_server_error() => {
                    last_error = Some(PaymentError::Api(format!(
                        "payment intent creation returned {}",
                        response.status()
                    )));
                }
                Ok(response) => return parse_intent_response(response).await,
                Err(e) => last_error = Some(PaymentError::Transport(e)),
            }
        }

        Err(last_error
            .unwrap_or_else(|| PaymentError::Api("payment intent creation failed".to_string())))
    }

    pub async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.api_base, intent_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        parse_intent_response(response).await
    }
}

async fn parse_intent_response(response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
    let body: serde_json::Value = response.json().await?;

    if let Some(error) = body.get("error") {
        let message = error["message"]
            .as_str()
            .unwrap_or("unknown payment provider error")
            .to_string();
        return Err(PaymentError::Api(message));
    }

    parse_intent(&body)
}

pub(crate) fn parse_intent(body: &serde_json::Value) -> Result<PaymentIntent, PaymentError> {
    let id = body["id"]
        .as_str()
        .ok_or(PaymentError::MalformedResponse("id"))?
        .to_string();
    let status = body["status"]
        .as_str()
        .ok_or(PaymentError::MalformedResponse("status"))?
        .to_string();

    let metadata = body["metadata"]
        .as_object()
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default();

    let payment_method_types = body["payment_method_types"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(PaymentIntent {
        id,
        status,
        amount: body["amount"].as_i64().unwrap_or(0),
        currency: body["currency"].as_str().unwrap_or("eur").to_string(),
        client_secret: body["client_secret"].as_str().map(str::to_string),
        payment_method_types,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_full_intent_payload() {
        let body = json!({
            "id": "pi_123",
            "status": "succeeded",
            "amount": 15000,
            "currency": "eur",
            "client_secret": "pi_123_secret_abc",
            "payment_method_types": ["card"],
            "metadata": {
                "booking_id": "7f9c0e7a-1111-2222-3333-444455556666",
                "customer_id": "00000000-0000-0000-0000-000000000001",
                "provider_id": "00000000-0000-0000-0000-000000000002"
            }
        });

        let intent = parse_intent(&body).unwrap();
        assert_eq!(intent.id, "pi_123");
        assert!(intent.succeeded());
        assert_eq!(intent.amount, 15000);
        assert_eq!(
            intent.booking_id(),
            Some("7f9c0e7a-1111-2222-3333-444455556666")
        );
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
    }

    #[test]
    fn missing_id_is_a_malformed_response() {
        let body = json!({ "status": "succeeded" });
        assert!(matches!(
            parse_intent(&body),
            Err(PaymentError::MalformedResponse("id"))
        ));
    }

    #[test]
    fn requires_status_field() {
        let body = json!({ "id": "pi_123" });
        assert!(matches!(
            parse_intent(&body),
            Err(PaymentError::MalformedResponse("status"))
        ));
    }
}
