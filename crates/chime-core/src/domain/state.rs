//! State - Goal の状態機械

use serde::{Deserialize, Serialize};
use std::fmt;

/// Goal の配送状態
///
/// 状態遷移:
/// - Pending -> Processing (claimed by the dispatcher)
/// - Processing -> Sent (delivered, no repeat)
/// - Processing -> Pending (delivered, rescheduled to the next weekday)
/// - Processing -> Failed (delivery error, never retried)
///
/// Pending から直接 Sent / Failed へは遷移しない（必ず Processing を経由）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// Waiting for its scheduled time.
    #[default]
    Pending,

    /// Claimed by the dispatcher; a send is in flight.
    Processing,

    /// Delivered (non-repeating goals only).
    Sent,

    /// Delivery failed.
    Failed,
}

impl GoalStatus {
    /// Can the dispatcher claim a goal in this state?
    pub fn is_claimable(self) -> bool {
        matches!(self, GoalStatus::Pending)
    }

    /// Is `next` a legal successor of `self`?
    ///
    /// Writing the current status again is allowed (edits that do not touch
    /// the status carry it along), except for `Processing`: a claim must
    /// start from `Pending`.
    pub fn can_transition_to(self, next: GoalStatus) -> bool {
        use GoalStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Sent)
                | (Processing, Pending)
                | (Processing, Failed)
                | (Pending, Pending)
                | (Sent, Sent)
                | (Failed, Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::Processing => "processing",
            GoalStatus::Sent => "sent",
            GoalStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
