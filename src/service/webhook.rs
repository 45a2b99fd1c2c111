use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::service::payment_gateway::{parse_intent, PaymentIntent};

/// Maximum allowed clock skew between the signature timestamp and now.
/// Deliveries older than this are treated as replays.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, PartialEq)]
pub enum WebhookError {
    #[error("missing or malformed signature header")]
    MalformedHeader,

    #[error("webhook signature does not match")]
    SignatureMismatch,

    #[error("webhook timestamp outside tolerance")]
    TimestampOutOfTolerance,

    #[error("webhook payload is not valid JSON: {0}")]
    InvalidPayload(String),
}

/// A verified event from the payment processor. Only the fields the
/// reconciliation path consumes are surfaced.
#[derive(Debug)]
pub struct WebhookEvent {
    pub event_type: String,
    pub intent: Option<PaymentIntent>,
}

/// Verifies the signature header over the raw body and only then parses it.
/// Header format: `t=<unix>,v1=<hex hmac>[,v1=...]` where the MAC is
/// HMAC-SHA256(secret, "<t>.<body>").
pub fn construct_event(
    payload: &str,
    signature_header: &str,
    secret: &str,
) -> Result<WebhookEvent, WebhookError> {
    verify_signature(payload, signature_header, secret, Utc::now().timestamp())?;

    let body: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let event_type = body["type"].as_str().unwrap_or_default().to_string();
    let intent = parse_intent(&body["data"]["object"]).ok();

    Ok(WebhookEvent { event_type, intent })
}

pub fn verify_signature(
    payload: &str,
    signature_header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<String> = Vec::new();

    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            Some(("v1", value)) => candidates.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if candidates.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }

    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::MalformedHeader)?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    let matches = candidates.iter().any(|candidate| {
        ConstantTimeEq::ct_eq(candidate.as_bytes(), expected.as_bytes()).into()
    });

    if matches {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: i64, secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_passes() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let now = 1_700_000_000;
        let header = sign(payload, now, SECRET);

        assert_eq!(verify_signature(payload, &header, SECRET, now), Ok(()));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = 1_700_000_000;
        let header = sign(r#"{"amount":100}"#, now, SECRET);

        assert_eq!(
            verify_signature(r#"{"amount":999999}"#, &header, SECRET, now),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let now = 1_700_000_000;
        let header = sign(payload, now, "whsec_other");

        assert_eq!(
            verify_signature(payload, &header, SECRET, now),
            Err(WebhookError::SignatureMismatch)
        );
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = "{}";
        let then = 1_700_000_000;
        let header = sign(payload, then, SECRET);

        assert_eq!(
            verify_signature(payload, &header, SECRET, then + SIGNATURE_TOLERANCE_SECS + 1),
            Err(WebhookError::TimestampOutOfTolerance)
        );
    }

    #[test]
    fn header_without_v1_is_malformed() {
        assert_eq!(
            verify_signature("{}", "t=1700000000", SECRET, 1_700_000_000),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature("{}", "v1=deadbeef", SECRET, 1_700_000_000),
            Err(WebhookError::MalformedHeader)
        );
    }

    #[test]
    fn construct_event_extracts_intent_metadata() {
        let payload = r#"{
            "type": "payment_intent.succeeded",
            "data": { "object": {
                "id": "pi_42",
                "status": "succeeded",
                "amount": 15000,
                "currency": "eur",
                "payment_method_types": ["card"],
                "metadata": { "booking_id": "b-1" }
            }}
        }"#;
        let now = Utc::now().timestamp();
        let header = sign(payload, now, SECRET);

        let event = construct_event(payload, &header, SECRET).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");
        let intent = event.intent.unwrap();
        assert_eq!(intent.id, "pi_42");
        assert_eq!(intent.booking_id(), Some("b-1"));
    }

    #[test]
    fn construct_event_never_parses_unverified_payloads() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let result = construct_event(payload, "t=1,v1=bad", SECRET);
        assert!(result.is_err());
    }
}
