//! Twilio SMS adapter for the messaging capability.

use async_trait::async_trait;
use reqwest::Client;

use crate::capabilities::traits::Messenger;
use crate::error::SendError;
use crate::storage::TwilioConfig;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio REST messenger. Posts one message per `send`; no retries.
pub struct TwilioMessenger {
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
    client: Client,
}

impl TwilioMessenger {
    pub fn new(config: &TwilioConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different endpoint (tests).
    pub fn with_base_url(config: &TwilioConfig, base_url: &str) -> Self {
        Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(SendError::NotConfigured("twilio"));
        }

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SendError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}
