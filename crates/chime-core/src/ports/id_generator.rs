//! IdGenerator port - ID 生成の抽象化
//!
//! 通常 Goal の ID は API 層が採番する。seed ファイル等で ID が省略された
//! Goal には ULID を割り当てる。
//!
//! # 実装
//! - **UlidGenerator**: [`Clock`] のタイムスタンプを使う ULID 生成

use crate::domain::GoalId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は新しい Goal ID を生成
pub trait IdGenerator: Send + Sync {
    fn generate_goal_id(&self) -> GoalId;
}

/// ULID-based generator.
///
/// The timestamp half comes from the clock, so a `FixedClock` gives ids with
/// a predictable prefix; the random half keeps them unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_goal_id(&self) -> GoalId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        GoalId::new(ulid.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_goal_id();
        let id2 = id_gen.generate_goal_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 26);
    }

    #[test]
    fn ulid_generator_uses_clock_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_goal_id();
        let id2 = id_gen.generate_goal_id();
        assert_ne!(id1, id2);

        let ulid1 = Ulid::from_string(id1.as_str()).unwrap();
        let ulid2 = Ulid::from_string(id2.as_str()).unwrap();
        assert_eq!(ulid1.timestamp_ms(), ulid2.timestamp_ms());
        assert_eq!(ulid1.timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}
