//! Domain - ドメインモデル
//!
//! ids, goal, state, recurrence, decision, events, errors を定義します。
//!
//! # 設計原則
//! - 純粋なロジックのみ（I/O なし、時計なし）
//! - 現在時刻は呼び出し側が `now` として渡す

pub mod decision;
pub mod errors;
pub mod events;
pub mod goal;
pub mod ids;
pub mod recurrence;
pub mod state;

pub use self::decision::{Decision, DeliveryDecider, Eligibility, EligibilityPolicy};
pub use self::errors::{CalculationError, DeliveryError, StoreError};
pub use self::events::DomainEvent;
pub use self::goal::{Goal, GoalPatch};
pub use self::ids::{GoalId, UserId};
pub use self::recurrence::{RepeatCalculator, RepeatDays};
pub use self::state::GoalStatus;
