//! Decision model: pure policy for what happens to a goal.
//!
//! Two questions are answered here, both without side effects:
//! - Is a goal eligible for delivery on this tick? ([`EligibilityPolicy`])
//! - Given a delivery result, where does the goal go next? ([`DeliveryDecider`])
//!
//! The dispatcher executes the answers against the store.

use chrono::{DateTime, Duration, Utc};

use super::errors::{CalculationError, DeliveryError};
use super::goal::{Goal, GoalPatch};
use super::recurrence::RepeatCalculator;
use super::state::GoalStatus;

/// Result of checking a goal snapshot against the delivery window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Due, fresh and pending: claim it.
    Eligible,

    /// Already claimed, delivered or failed.
    NotPending(GoalStatus),

    /// Scheduled in the future.
    NotYetDue,

    /// Due longer ago than the staleness window. Stays pending until
    /// someone moves `scheduled_time`.
    Stale { overdue: Duration },
}

/// Due-but-not-stale window check.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityPolicy {
    staleness_window: Duration,
}

impl EligibilityPolicy {
    pub fn new(staleness_window: Duration) -> Self {
        Self { staleness_window }
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    pub fn check(&self, goal: &Goal, now: DateTime<Utc>) -> Eligibility {
        if !goal.status.is_claimable() {
            return Eligibility::NotPending(goal.status);
        }
        if goal.scheduled_time > now {
            return Eligibility::NotYetDue;
        }
        let overdue = now - goal.scheduled_time;
        if overdue > self.staleness_window {
            return Eligibility::Stale { overdue };
        }
        Eligibility::Eligible
    }
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(60))
    }
}

/// Where a claimed goal goes after its delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Delivered and repeating: back to pending at `next`.
    Reschedule { next: DateTime<Utc> },

    /// Delivered and done. `recurrence_error` is set when the goal asked to
    /// repeat but its repeat days were unusable.
    MarkSent {
        recurrence_error: Option<CalculationError>,
    },

    /// Delivery failed. Terminal, even for repeating goals.
    MarkFailed { reason: String },
}

impl Decision {
    pub fn status(&self) -> GoalStatus {
        match self {
            Decision::Reschedule { .. } => GoalStatus::Pending,
            Decision::MarkSent { .. } => GoalStatus::Sent,
            Decision::MarkFailed { .. } => GoalStatus::Failed,
        }
    }

    /// Store update that carries out this decision.
    pub fn patch(&self, goal: &Goal) -> GoalPatch {
        match self {
            Decision::Reschedule { next } => GoalPatch::reschedule(*next, goal.repeat_days.clone()),
            Decision::MarkSent { .. } => GoalPatch::status(GoalStatus::Sent),
            Decision::MarkFailed { .. } => GoalPatch::status(GoalStatus::Failed),
        }
    }

    /// Only delivered goals announce completion.
    pub fn emits_completion(&self) -> bool {
        !matches!(self, Decision::MarkFailed { .. })
    }
}

/// Maps a delivery result to a [`Decision`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryDecider {
    calculator: RepeatCalculator,
}

impl DeliveryDecider {
    pub fn new(calculator: RepeatCalculator) -> Self {
        Self { calculator }
    }

    /// `now` is the moment the send returned; recurrence counts from it.
    pub fn decide(
        &self,
        goal: &Goal,
        delivery: &Result<String, DeliveryError>,
        now: DateTime<Utc>,
    ) -> Decision {
        if let Err(err) = delivery {
            return Decision::MarkFailed {
                reason: err.to_string(),
            };
        }
        if !goal.is_recurring() {
            return Decision::MarkSent {
                recurrence_error: None,
            };
        }
        match self
            .calculator
            .next_occurrence(&goal.repeat_days, goal.scheduled_time, now)
        {
            Ok(next) => Decision::Reschedule { next },
            Err(err) => Decision::MarkSent {
                recurrence_error: Some(err),
            },
        }
    }
}
