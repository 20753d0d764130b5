//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてリマインダー配送を実装します。
//!
//! # 主要コンポーネント
//! - **DispatcherBuilder**: ディスパッチャの構築とワイヤリング（Fail-fast 検証）
//! - **ReminderDispatcher**: 1 tick 分の処理（list→check→claim→send→decide→update→emit）
//! - **DispatcherHandle**: interval ループと shutdown
//! - **TickReport**: 1 tick の集計

pub mod builder;
pub mod dispatch_loop;
pub mod dispatcher;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatch_loop::DispatcherHandle;
pub use self::dispatcher::ReminderDispatcher;
pub use self::status::TickReport;
