//! EventBroadcaster port - 購読者への完了イベント通知

use crate::domain::DomainEvent;

/// ドメインイベントの fire-and-forget 配信
///
/// Implementations swallow delivery problems (no subscribers, slow
/// subscribers); the dispatcher never learns about them.
pub trait EventBroadcaster: Send + Sync {
    fn emit(&self, event: DomainEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBroadcaster;

impl EventBroadcaster for NoopBroadcaster {
    fn emit(&self, _event: DomainEvent) {}
}
