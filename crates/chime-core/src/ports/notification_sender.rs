//! NotificationSender port - テキストメッセージの送信

use async_trait::async_trait;

use crate::domain::DeliveryError;

/// 1 通のテキストメッセージを配送
///
/// エラーはその試行にとって最終結果（ディスパッチャはリトライしない）
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Returns the provider's message id.
    async fn send(&self, phone: &str, message: &str) -> Result<String, DeliveryError>;
}
