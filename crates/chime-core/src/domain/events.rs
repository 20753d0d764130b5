//! Events - domain events published by the dispatcher.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::GoalId;

/// DomainEvent is something subscribers may want to hear about.
///
/// Serialized with the event name as `event` and the body under `payload`,
/// which is the shape websocket clients already consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A goal was delivered (whether or not it repeats).
    #[serde(rename_all = "camelCase")]
    ReminderDone {
        id: GoalId,
        message: String,
        completed_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ReminderDone { .. } => "reminder_done",
        }
    }

    /// Event body without the name.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            DomainEvent::ReminderDone {
                id,
                message,
                completed_at,
            } => serde_json::json!({
                "id": id,
                "message": message,
                "completedAt": completed_at,
            }),
        }
    }
}
