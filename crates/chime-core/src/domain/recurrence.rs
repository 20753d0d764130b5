//! Weekly recurrence: computes the next fire time of a repeating goal.
//!
//! Weekdays are numbered from Sunday (0) to Saturday (6). All weekday and
//! time-of-day arithmetic happens in the configured local offset; the result
//! is returned in UTC.
//!
//! The search for the next day is strictly after the current weekday, so a
//! goal that fires on one of its repeat days never fires again on that same
//! calendar day. With a single repeat day this means the next occurrence is
//! exactly one week later.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveTime, Offset, TimeZone, Timelike, Utc};

use super::errors::CalculationError;

/// Sanitized set of weekdays (0 = Sunday).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatDays(BTreeSet<u32>);

impl RepeatDays {
    /// Validate raw weekday numbers. Duplicates collapse; order does not matter.
    pub fn parse(raw: &[i32]) -> Result<Self, CalculationError> {
        let mut days = BTreeSet::new();
        for &day in raw {
            if !(0..=6).contains(&day) {
                return Err(CalculationError::DayOutOfRange(day));
            }
            days.insert(day as u32);
        }
        if days.is_empty() {
            return Err(CalculationError::NoRepeatDays);
        }
        Ok(Self(days))
    }

    /// Days until the next configured weekday after `current_day`, wrapping
    /// into next week when `current_day` is on or after every configured day.
    pub fn days_until_next(&self, current_day: u32) -> u32 {
        match self.0.iter().find(|&&day| day > current_day) {
            Some(day) => day - current_day,
            None => {
                // parse() guarantees at least one day
                let first = self.0.iter().next().copied().unwrap_or(current_day);
                (7 - current_day) + first
            }
        }
    }
}

/// Computes the next occurrence of a weekly recurring goal.
#[derive(Debug, Clone, Copy)]
pub struct RepeatCalculator {
    offset: FixedOffset,
}

impl RepeatCalculator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Next fire time after a delivery at `now`.
    ///
    /// The date comes from `now` plus the day offset; hour and minute come
    /// from `original` (the goal's previous scheduled time); seconds are zero.
    pub fn next_occurrence(
        &self,
        repeat_days: &[i32],
        original: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, CalculationError> {
        let days = RepeatDays::parse(repeat_days)?;

        let local_now = now.with_timezone(&self.offset);
        let local_original = original.with_timezone(&self.offset);

        let current_day = local_now.weekday().num_days_from_sunday();
        let days_until_next = days.days_until_next(current_day);

        let date = local_now
            .date_naive()
            .checked_add_days(Days::new(u64::from(days_until_next)))
            .ok_or(CalculationError::Unrepresentable)?;
        let time = NaiveTime::from_hms_opt(local_original.hour(), local_original.minute(), 0)
            .ok_or(CalculationError::Unrepresentable)?;

        self.offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|next| next.with_timezone(&Utc))
            .ok_or(CalculationError::Unrepresentable)
    }
}

impl Default for RepeatCalculator {
    fn default() -> Self {
        Self::utc()
    }
}
