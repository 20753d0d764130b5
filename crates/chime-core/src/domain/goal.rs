//! Goal record and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::StoreError;
use super::ids::{GoalId, UserId};
use super::state::GoalStatus;

/// A scheduled, possibly recurring, text reminder owned by one user.
///
/// The store owns goal records. The dispatcher reads snapshots each tick and
/// changes them only through [`GoalPatch`] updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: GoalId,

    #[serde(alias = "userId")]
    pub owner_id: UserId,

    /// Message body sent to `phone`.
    pub text: String,

    /// When the goal should fire.
    #[serde(alias = "time")]
    pub scheduled_time: DateTime<Utc>,

    /// Destination number captured when the goal was created.
    pub phone: String,

    #[serde(default)]
    pub is_repeat_enabled: bool,

    /// Weekdays (0 = Sunday). Ignored unless `is_repeat_enabled`.
    #[serde(default)]
    pub repeat_days: Vec<i32>,

    #[serde(default)]
    pub status: GoalStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// A new pending, non-repeating goal.
    pub fn new(
        id: GoalId,
        owner_id: UserId,
        text: impl Into<String>,
        scheduled_time: DateTime<Utc>,
        phone: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            text: text.into(),
            scheduled_time,
            phone: phone.into(),
            is_repeat_enabled: false,
            repeat_days: Vec::new(),
            status: GoalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_repeat_days(mut self, days: impl Into<Vec<i32>>) -> Self {
        self.is_repeat_enabled = true;
        self.repeat_days = days.into();
        self
    }

    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    /// Should a successful delivery reschedule this goal?
    pub fn is_recurring(&self) -> bool {
        self.is_repeat_enabled && !self.repeat_days.is_empty()
    }

    /// Apply a patch in place and bump `updated_at`.
    pub fn apply(&mut self, patch: &GoalPatch, now: DateTime<Utc>) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(time) = patch.scheduled_time {
            self.scheduled_time = time;
        }
        if let Some(enabled) = patch.is_repeat_enabled {
            self.is_repeat_enabled = enabled;
        }
        if let Some(days) = &patch.repeat_days {
            self.repeat_days = days.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

/// Partial update of a goal. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub text: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub is_repeat_enabled: Option<bool>,
    pub repeat_days: Option<Vec<i32>>,
    pub status: Option<GoalStatus>,
}

impl GoalPatch {
    pub fn status(status: GoalStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Back to pending at `next`, keeping the recurrence as it was.
    pub fn reschedule(next: DateTime<Utc>, repeat_days: Vec<i32>) -> Self {
        Self {
            scheduled_time: Some(next),
            is_repeat_enabled: Some(true),
            repeat_days: Some(repeat_days),
            status: Some(GoalStatus::Pending),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.scheduled_time.is_none()
            && self.is_repeat_enabled.is_none()
            && self.repeat_days.is_none()
            && self.status.is_none()
    }

    /// Build a patch from a raw field map (camelCase keys, as sent by the API).
    ///
    /// Unknown keys are logged and skipped. A known key with a value of the
    /// wrong type is an error.
    pub fn from_fields(
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, StoreError> {
        let mut patch = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "text" => patch.text = Some(field_value(key, value)?),
                "time" | "scheduledTime" => patch.scheduled_time = Some(field_value(key, value)?),
                "isRepeatEnabled" => patch.is_repeat_enabled = Some(field_value(key, value)?),
                "repeatDays" => patch.repeat_days = Some(field_value(key, value)?),
                "status" => patch.status = Some(field_value(key, value)?),
                unknown => warn!(field = unknown, "skipping unknown goal update field"),
            }
        }
        Ok(patch)
    }
}

fn field_value<T: serde::de::DeserializeOwned>(
    field: &str,
    value: &serde_json::Value,
) -> Result<T, StoreError> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::InvalidPatch {
        field: field.to_string(),
        reason: e.to_string(),
    })
}
