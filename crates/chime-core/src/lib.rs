//! chime-core
//!
//! Reminder scheduling and delivery: a polling dispatcher that finds due
//! goals, sends them as SMS, and reschedules the ones that repeat.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, goal, state, recurrence, decision, events, errors）
//! - **ports**: 抽象化レイヤー（GoalStore, NotificationSender, EventBroadcaster, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（builder, dispatcher, dispatch_loop, status）
//! - **impls**: 実装（InMemoryGoalStore, TextbeltSender, LogSender, ChannelBroadcaster）
//! - **config**: TOML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{BuildError, DispatcherBuilder, DispatcherHandle, ReminderDispatcher, TickReport};
pub use config::ChimeConfig;
pub use error::ConfigError;
