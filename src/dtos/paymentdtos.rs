use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentDto {
    #[serde(rename = "bookingId")]
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentDto {
    #[serde(rename = "bookingId")]
    pub booking_id: Uuid,

    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
}

/// Only the client secret leaves the server; the rest of the intent stays
/// between us and the processor.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientSecretDto {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAckDto {
    pub received: bool,
}
