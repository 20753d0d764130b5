//! Ports - 外部システムとの境界
//!
//! ディスパッチャが利用するが所有しないもの（DB、SMS プロバイダ、
//! websocket 購読者、時計）をここで trait として定義します。
//!
//! # 設計原則
//! - GoalStore が正本（source of truth）。ディスパッチャは tick 間で状態を持たない
//! - すべての port は object-safe かつ `Send + Sync`（`Arc<dyn _>` で保持）

pub mod clock;
pub mod event_sink;
pub mod goal_store;
pub mod id_generator;
pub mod notification_sender;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::{EventBroadcaster, NoopBroadcaster};
pub use self::goal_store::GoalStore;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notification_sender::NotificationSender;
