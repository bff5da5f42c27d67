//! SMS delivery through an HTTP gateway.
//!
//! Thin client for a transactional SMS provider: POSTs JSON to the
//! configured endpoint with bearer auth. Message content is caller-provided;
//! the gateway handles sender-id compliance and routing.

use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;

use crate::config::SmsConfig;

/// Errors that can occur when sending SMS.
#[derive(Debug, Error)]
pub enum SmsError {
    /// HTTP transport error.
    #[error("SMS transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Gateway rejected the message.
    #[error("SMS gateway error ({status}): {body}")]
    Gateway {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    sender_id: &'a str,
    message: &'a str,
}

/// SMS gateway client.
#[derive(Debug, Clone)]
pub struct SmsService {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsService {
    /// Create a new SMS service from configuration.
    #[must_use]
    pub fn new(config: SmsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Send a message to a single phone number.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the gateway responds non-2xx.
    pub async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&GatewayRequest {
                to,
                sender_id: &self.config.sender_id,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %to, "SMS accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_request_shape() {
        let request = GatewayRequest {
            to: "+911234567890",
            sender_id: "CRFTLN",
            message: "Order ORD-42 shipped",
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["to"], "+911234567890");
        assert_eq!(json["sender_id"], "CRFTLN");
        assert_eq!(json["message"], "Order ORD-42 shipped");
    }
}
