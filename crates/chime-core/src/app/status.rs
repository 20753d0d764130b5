//! Status - tick の結果（観測用ビュー）

use serde::{Deserialize, Serialize};

/// 1 tick 分の集計
///
/// `sent`, `rescheduled` and `failed` count delivery outcomes even when the
/// store write recording them failed; `store_errors` counts failed store
/// calls of any kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub users: usize,
    pub scanned: usize,
    pub claimed: usize,
    pub sent: usize,
    pub rescheduled: usize,
    pub failed: usize,
    pub skipped_future: usize,
    pub skipped_stale: usize,
    pub skipped_not_pending: usize,
    pub store_errors: usize,
}

impl TickReport {
    /// Goals that reached the provider this tick, whatever the result.
    pub fn delivery_attempts(&self) -> usize {
        self.sent + self.rescheduled + self.failed
    }

    pub fn is_idle(&self) -> bool {
        self.claimed == 0 && self.store_errors == 0
    }
}
