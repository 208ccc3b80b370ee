//! # WhatsApp Gateway Client
//!
//! Thin client for the hosted WhatsApp gateway. Three endpoints:
//!
//! - `POST /send-image-url` — deliver the invoice link with a caption
//! - `GET /status/{token}` — session pairing state
//! - `GET /qr/{token}` — pairing QR code image
//!
//! The gateway authenticates with a session token stored in config (see
//! [`kirana_core::TOKEN_CONFIG_KEY`]); there is no retry logic, a failed
//! send surfaces as a failed notification step on the submission report.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BillingError, BillingResult};

/// Builds the gateway recipient number: country calling code glued onto
/// the stored 10-digit phone number (`91` + `9876543210` = `919876543210`).
pub fn recipient_number(country_code: &str, phone: &str) -> String {
    format!("{country_code}{phone}")
}

// =============================================================================
// Wire Types
// =============================================================================

/// Payload for `POST /send-image-url`.
#[derive(Debug, Serialize)]
struct SendImagePayload<'a> {
    token: &'a str,
    number: &'a str,
    #[serde(rename = "imageUrl")]
    image_url: &'a str,
    caption: &'a str,
}

/// Error body the gateway returns on a rejected request.
#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Session pairing state from `GET /status/{token}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    /// Gateway-reported state, e.g. `"connected"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable detail, when the gateway provides one.
    #[serde(default)]
    pub message: Option<String>,
}

impl SessionStatus {
    /// Whether the session is paired and ready to send.
    pub fn is_connected(&self) -> bool {
        matches!(self.status.as_deref(), Some("connected"))
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for the WhatsApp messaging gateway.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    http: Client,
    base_url: String,
    country_code: String,
}

impl WhatsAppClient {
    /// Creates a new WhatsAppClient.
    pub fn new(base_url: impl Into<String>, country_code: impl Into<String>) -> Self {
        WhatsAppClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            country_code: country_code.into(),
        }
    }

    /// Sends the invoice link to a customer.
    ///
    /// `phone` is the stored 10-digit number; the country code is prepended
    /// here. A non-success response is reported with the gateway's own
    /// `message` when it sends one.
    pub async fn send_invoice_link(
        &self,
        token: &str,
        phone: &str,
        image_url: &str,
        caption: &str,
    ) -> BillingResult<()> {
        let number = recipient_number(&self.country_code, phone);
        debug!(number, image_url, "Sending invoice via gateway");

        let response = self
            .http
            .post(format!("{}/send-image-url", self.base_url))
            .json(&SendImagePayload {
                token,
                number: &number,
                image_url,
                caption,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let body: GatewayErrorBody = response.json().await.unwrap_or(GatewayErrorBody {
                message: None,
            });
            return Err(BillingError::Gateway {
                message: body
                    .message
                    .unwrap_or_else(|| "Failed to send WhatsApp message.".to_string()),
            });
        }

        Ok(())
    }

    /// Queries the pairing state of a session token.
    pub async fn session_status(&self, token: &str) -> BillingResult<SessionStatus> {
        let status = self
            .http
            .get(format!("{}/status/{token}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(status)
    }

    /// Fetches the pairing QR code image for a session token.
    pub async fn pairing_qr(&self, token: &str) -> BillingResult<Vec<u8>> {
        let bytes = self
            .http
            .get(format!("{}/qr/{token}", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_number_prepends_country_code() {
        assert_eq!(recipient_number("91", "9876543210"), "919876543210");
    }

    #[test]
    fn test_send_payload_wire_shape() {
        let payload = SendImagePayload {
            token: "session-abc",
            number: "919876543210",
            image_url: "https://files.example.shop/invoices/Invoice_x.pdf",
            caption: "Hello, here is your invoice: Invoice_x.pdf",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["token"], "session-abc");
        assert_eq!(json["number"], "919876543210");
        // Gateway expects camelCase here.
        assert_eq!(
            json["imageUrl"],
            "https://files.example.shop/invoices/Invoice_x.pdf"
        );
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_session_status_connected() {
        let status: SessionStatus =
            serde_json::from_str(r#"{"status":"connected"}"#).unwrap();
        assert!(status.is_connected());

        let pending: SessionStatus =
            serde_json::from_str(r#"{"status":"pending","message":"scan the QR"}"#).unwrap();
        assert!(!pending.is_connected());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = WhatsAppClient::new("https://wa.medblisss.com/", "91");
        assert_eq!(client.base_url, "https://wa.medblisss.com");
    }
}
