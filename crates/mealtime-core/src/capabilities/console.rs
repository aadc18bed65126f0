//! Console fallbacks used when a real channel is not configured.

use async_trait::async_trait;

use crate::capabilities::traits::{Messenger, Popup};
use crate::error::SendError;

/// Prints outbound messages to stdout instead of dispatching SMS.
#[derive(Default)]
pub struct ConsoleMessenger;

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        println!("[sms -> {to}] {body}");
        Ok(())
    }
}

/// Prints popups to stdout (headless environments).
#[derive(Default)]
pub struct ConsolePopup;

#[async_trait]
impl Popup for ConsolePopup {
    async fn show(&self, title: &str, body: &str) -> Result<(), SendError> {
        println!("[popup] {title}: {body}");
        Ok(())
    }
}
