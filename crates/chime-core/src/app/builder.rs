//! DispatcherBuilder - ディスパッチャの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 省略可能な依存にはデフォルトを与える（NoopBroadcaster, SystemClock）

use std::sync::Arc;

use super::dispatcher::ReminderDispatcher;
use crate::config::DispatcherConfig;
use crate::domain::{DeliveryDecider, EligibilityPolicy, RepeatCalculator};
use crate::error::ConfigError;
use crate::ports::{
    Clock, EventBroadcaster, GoalStore, NoopBroadcaster, NotificationSender, SystemClock,
};

/// DispatcherBuilder は [`ReminderDispatcher`] を構築
///
/// # Fail-fast 設計
/// - store と sender は必須。欠けていれば build() が BuildError を返す
/// - 設定値の検証も build() 時に行う
///
/// # 使用例
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .store(Arc::new(store))
///     .sender(Arc::new(LogSender::new()))
///     .config(config.dispatcher)
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    store: Option<Arc<dyn GoalStore>>,
    sender: Option<Arc<dyn NotificationSender>>,
    broadcaster: Arc<dyn EventBroadcaster>,
    clock: Arc<dyn Clock>,
    config: DispatcherConfig,
}

/// BuildError はディスパッチャ構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no goal store configured")]
    MissingStore,

    #[error("no notification sender configured")]
    MissingSender,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            sender: None,
            broadcaster: Arc::new(NoopBroadcaster),
            clock: Arc::new(SystemClock),
            config: DispatcherConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn GoalStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn sender(mut self, sender: Arc<dyn NotificationSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn broadcaster(mut self, broadcaster: Arc<dyn EventBroadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ReminderDispatcher, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let sender = self.sender.ok_or(BuildError::MissingSender)?;
        self.config.validate()?;
        let offset = self.config.utc_offset()?;
        let staleness_window = self.config.staleness_window()?;

        Ok(ReminderDispatcher {
            store,
            sender,
            broadcaster: self.broadcaster,
            clock: self.clock,
            policy: EligibilityPolicy::new(staleness_window),
            decider: DeliveryDecider::new(RepeatCalculator::new(offset)),
            tick_interval: self.config.tick_interval(),
            send_timeout: self.config.send_timeout(),
            debug_logs: self.config.debug_logs,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
