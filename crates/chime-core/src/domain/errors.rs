//! Errors - 関心ごとのエラー型
//!
//! - `StoreError`: GoalStore の読み書きに失敗
//! - `DeliveryError`: SMS プロバイダがメッセージを受け付けなかった
//! - `CalculationError`: `repeat_days` から次回時刻を計算できない

use thiserror::Error;

use super::ids::{GoalId, UserId};
use super::state::GoalStatus;

/// Failure talking to the goal store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("invalid update for field `{field}`: {reason}")]
    InvalidPatch { field: String, reason: String },

    #[error("goal {0} already exists")]
    DuplicateGoal(GoalId),

    #[error("user {0} does not exist")]
    UnknownUser(UserId),

    #[error("goal {goal} cannot move from {from} to {to}")]
    IllegalTransition {
        goal: GoalId,
        from: GoalStatus,
        to: GoalStatus,
    },
}

/// Failure delivering a notification. Always terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider rejected message: {0}")]
    Rejected(String),

    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// `repeat_days` could not produce a next occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("repeat days are empty")]
    NoRepeatDays,

    #[error("repeat day {0} is outside 0..=6")]
    DayOutOfRange(i32),

    #[error("next occurrence is not representable")]
    Unrepresentable,
}
