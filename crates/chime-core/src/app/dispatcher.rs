//! ReminderDispatcher - one polling pass over every goal.
//!
//! # Flow per tick
//! 1. GoalStore::list_user_ids()
//! 2. GoalStore::list_goals() per user
//! 3. EligibilityPolicy::check() on the snapshot (pending, due, not stale)
//! 4. GoalStore::get_goal() to re-check the status right before claiming
//! 5. GoalStore::update_goal(processing), the claim
//! 6. NotificationSender::send() under a timeout
//! 7. DeliveryDecider::decide() -> GoalStore::update_goal(sent | pending | failed)
//! 8. EventBroadcaster::emit(reminder_done) for delivered goals
//!
//! Goals are processed one at a time in store order. Only a failure to list
//! users ends a tick early; everything else is logged and the tick moves on.
//!
//! The claim is not transactional. It keeps this dispatcher from delivering
//! the same occurrence twice (ticks never overlap and the claim is written
//! before the send), but two dispatchers sharing a store can both claim the
//! same goal. Run exactly one.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::status::TickReport;
use crate::domain::{
    Decision, DeliveryDecider, DeliveryError, DomainEvent, Eligibility, EligibilityPolicy, Goal,
    GoalPatch, GoalStatus, StoreError,
};
use crate::ports::{Clock, EventBroadcaster, GoalStore, NotificationSender};

/// Logs at info when verbose claim/skip tracing is on, at debug otherwise.
macro_rules! verbose {
    ($on:expr, $($arg:tt)+) => {
        if $on {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Drives delivery of due goals. Build one with
/// [`DispatcherBuilder`](super::builder::DispatcherBuilder).
pub struct ReminderDispatcher {
    pub(super) store: Arc<dyn GoalStore>,
    pub(super) sender: Arc<dyn NotificationSender>,
    pub(super) broadcaster: Arc<dyn EventBroadcaster>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) policy: EligibilityPolicy,
    pub(super) decider: DeliveryDecider,
    pub(super) tick_interval: Duration,
    pub(super) send_timeout: Duration,
    pub(super) debug_logs: bool,
}

impl ReminderDispatcher {
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Run one full pass.
    ///
    /// Errors only when the user list cannot be read; the next tick starts
    /// over from scratch.
    pub async fn tick(&self) -> Result<TickReport, StoreError> {
        let mut report = TickReport::default();

        let user_ids = self.store.list_user_ids().await.inspect_err(|e| {
            error!(error = %e, "cannot list users; abandoning tick");
        })?;
        report.users = user_ids.len();

        for user_id in &user_ids {
            let goals = match self.store.list_goals(user_id).await {
                Ok(goals) => goals,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "cannot list goals; skipping user");
                    report.store_errors += 1;
                    continue;
                }
            };

            for goal in goals {
                report.scanned += 1;
                self.process_goal(goal, &mut report).await;
            }
        }

        if !report.is_idle() {
            debug!(attempts = report.delivery_attempts(), ?report, "tick finished");
        }
        Ok(report)
    }

    async fn process_goal(&self, goal: Goal, report: &mut TickReport) {
        let now = self.clock.now();
        match self.policy.check(&goal, now) {
            Eligibility::Eligible => {}
            Eligibility::NotPending(_) => {
                report.skipped_not_pending += 1;
                return;
            }
            Eligibility::NotYetDue => {
                report.skipped_future += 1;
                return;
            }
            Eligibility::Stale { overdue } => {
                verbose!(
                    self.debug_logs,
                    goal_id = %goal.id,
                    overdue_secs = overdue.num_seconds(),
                    "goal missed its delivery window; skipping"
                );
                report.skipped_stale += 1;
                return;
            }
        }

        verbose!(
            self.debug_logs,
            goal_id = %goal.id,
            user_id = %goal.owner_id,
            scheduled_time = %goal.scheduled_time,
            now = %now,
            "goal is due"
        );

        let Some(claimed) = self.claim(&goal, report).await else {
            return;
        };

        let delivery = self.deliver(&claimed).await;
        let completed_at = self.clock.now();
        let decision = self.decider.decide(&claimed, &delivery, completed_at);
        self.log_decision(&claimed, &delivery, &decision);

        match &decision {
            Decision::Reschedule { .. } => report.rescheduled += 1,
            Decision::MarkSent { .. } => report.sent += 1,
            Decision::MarkFailed { .. } => report.failed += 1,
        }

        match self
            .store
            .update_goal(&claimed.id, decision.patch(&claimed))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(goal_id = %claimed.id, "goal deleted while its reminder was in flight");
            }
            Err(e) => {
                error!(
                    goal_id = %claimed.id,
                    status = %decision.status(),
                    error = %e,
                    "cannot record delivery outcome; goal stays processing"
                );
                report.store_errors += 1;
                return;
            }
        }

        if decision.emits_completion() {
            self.broadcaster.emit(DomainEvent::ReminderDone {
                id: claimed.id.clone(),
                message: claimed.text.clone(),
                completed_at,
            });
        }
    }

    /// Re-read the goal and move it to processing.
    ///
    /// Returns the claimed record, or `None` when the goal is gone, no longer
    /// pending, or the store failed.
    async fn claim(&self, goal: &Goal, report: &mut TickReport) -> Option<Goal> {
        let current = match self.store.get_goal(&goal.id).await {
            Ok(Some(current)) => current,
            Ok(None) => {
                verbose!(self.debug_logs, goal_id = %goal.id, "goal deleted before claim; skipping");
                report.skipped_not_pending += 1;
                return None;
            }
            Err(e) => {
                warn!(goal_id = %goal.id, error = %e, "cannot re-check goal before claim");
                report.store_errors += 1;
                return None;
            }
        };

        if !current.status.is_claimable() {
            verbose!(
                self.debug_logs,
                goal_id = %goal.id,
                status = %current.status,
                "goal already moved on; skipping"
            );
            report.skipped_not_pending += 1;
            return None;
        }

        match self
            .store
            .update_goal(&current.id, GoalPatch::status(GoalStatus::Processing))
            .await
        {
            Ok(Some(claimed)) => {
                verbose!(self.debug_logs, goal_id = %claimed.id, "claimed goal");
                report.claimed += 1;
                Some(claimed)
            }
            Ok(None) => {
                verbose!(self.debug_logs, goal_id = %goal.id, "goal deleted during claim; skipping");
                report.skipped_not_pending += 1;
                None
            }
            Err(StoreError::IllegalTransition { from, .. }) => {
                verbose!(
                    self.debug_logs,
                    goal_id = %goal.id,
                    status = %from,
                    "goal moved on during claim; skipping"
                );
                report.skipped_not_pending += 1;
                None
            }
            Err(e) => {
                warn!(goal_id = %goal.id, error = %e, "cannot claim goal");
                report.store_errors += 1;
                None
            }
        }
    }

    async fn deliver(&self, goal: &Goal) -> Result<String, DeliveryError> {
        let send = self.sender.send(&goal.phone, &goal.text);
        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(self.send_timeout)),
        }
    }

    fn log_decision(
        &self,
        goal: &Goal,
        delivery: &Result<String, DeliveryError>,
        decision: &Decision,
    ) {
        match (delivery, decision) {
            (Ok(message_id), Decision::Reschedule { next }) => {
                tracing::info!(
                    goal_id = %goal.id,
                    message_id = %message_id,
                    next = %next,
                    "reminder sent; rescheduled"
                );
            }
            (Ok(message_id), Decision::MarkSent { recurrence_error }) => {
                if let Some(err) = recurrence_error {
                    warn!(
                        goal_id = %goal.id,
                        repeat_days = ?goal.repeat_days,
                        error = %err,
                        "cannot compute next occurrence; treating goal as one-shot"
                    );
                }
                tracing::info!(goal_id = %goal.id, message_id = %message_id, "reminder sent");
            }
            (_, Decision::MarkFailed { reason }) => {
                error!(goal_id = %goal.id, reason = %reason, "failed to send reminder");
            }
            (Err(_), _) => {}
        }
    }
}
