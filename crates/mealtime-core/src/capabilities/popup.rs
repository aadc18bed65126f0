//! Desktop popup adapter for the popup capability.

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::capabilities::traits::Popup;
use crate::error::SendError;

const POPUP_TIMEOUT_MS: u32 = 10_000;

/// Native desktop notification via the OS notification service.
#[derive(Default)]
pub struct DesktopPopup;

impl DesktopPopup {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Popup for DesktopPopup {
    async fn show(&self, title: &str, body: &str) -> Result<(), SendError> {
        Notification::new()
            .summary(title)
            .body(body)
            .timeout(Timeout::Milliseconds(POPUP_TIMEOUT_MS))
            .show()
            .map(|_| ())
            .map_err(|e| SendError::Failed(e.to_string()))
    }
}
