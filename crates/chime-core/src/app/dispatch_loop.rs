//! DispatchLoop - 一定間隔で [`ReminderDispatcher::tick`] を実行
//!
//! # 設計方針
//! - tick は重ならない（前の tick が返るまで次は始まらない）
//! - 遅い tick の間に来た分はスキップする（溜めない）
//! - shutdown は watch channel で通知

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::dispatcher::ReminderDispatcher;

/// 実行中のディスパッチループへのハンドル
/// - `request_shutdown()` で実行中の tick の後に止まる
/// - `shutdown_and_join()` で終了まで待てる
pub struct DispatcherHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<u64>,
}

impl DispatcherHandle {
    /// 現在の tokio ランタイム上でポーリングを開始
    pub fn spawn(dispatcher: Arc<ReminderDispatcher>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move { dispatch_loop(dispatcher, shutdown_rx).await });
        Self { shutdown_tx, join }
    }

    /// ループに停止を要求する。
    /// 実行中の tick は強制キャンセルせず、最後まで走らせる。
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown して終了を待つ。実行された tick 数を返す。
    pub async fn shutdown_and_join(self) -> u64 {
        self.request_shutdown();
        match self.join.await {
            Ok(ticks) => ticks,
            Err(e) => {
                error!(error = %e, "dispatch loop panicked");
                0
            }
        }
    }
}

async fn dispatch_loop(
    dispatcher: Arc<ReminderDispatcher>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> u64 {
    let mut interval = tokio::time::interval(dispatcher.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0u64;

    info!(interval_ms = dispatcher.tick_interval().as_millis() as u64, "dispatcher started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                // sender dropped
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        // tick errors are already logged; the next tick starts fresh
        let _ = dispatcher.tick().await;
        ticks += 1;
    }

    info!(ticks, "dispatcher stopped");
    ticks
}
