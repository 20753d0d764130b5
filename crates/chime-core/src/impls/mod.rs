//! Impls - ports の具体実装
//!
//! # 含まれる実装
//! - **InMemoryGoalStore**: CLI・テスト用の GoalStore
//! - **TextbeltSender**: Textbelt HTTP API 経由の SMS 送信
//! - **LogSender**: dry-run 用（ログ出力のみ）
//! - **ChannelBroadcaster**: tokio broadcast channel による完了イベント配信
//!
//! DB 版の `GoalStore` は API サービス側に置く。

pub mod broadcast;
pub mod inmem_store;
pub mod log_sender;
pub mod textbelt;

pub use self::broadcast::ChannelBroadcaster;
pub use self::inmem_store::InMemoryGoalStore;
pub use self::log_sender::LogSender;
pub use self::textbelt::TextbeltSender;
