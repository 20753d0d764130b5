//! LogSender - ログ出力のみの dry-run 用 sender

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::domain::DeliveryError;
use crate::ports::NotificationSender;

/// Logs each message instead of sending it and returns `dry-run-<n>` ids.
#[derive(Debug, Default)]
pub struct LogSender {
    sent: AtomicU64,
}

impl LogSender {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, DeliveryError> {
        if phone.trim().is_empty() || message.trim().is_empty() {
            return Err(DeliveryError::InvalidRequest(
                "missing phone or message".to_string(),
            ));
        }
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(phone, message, "dry run: not sending SMS");
        Ok(format!("dry-run-{n}"))
    }
}
