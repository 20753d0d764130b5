//! GoalStore port - ディスパッチャが読み書きする永続化層
//!
//! Goal の作成・削除は API 層の責務であり、この interface には含めない。

use async_trait::async_trait;

use crate::domain::{Goal, GoalId, GoalPatch, StoreError, UserId};

/// GoalStore は Goal 状態の正本（source of truth）
///
/// # 整合性
/// - トランザクションなし（各呼び出しは独立）
/// - 書き込みは `update_goal` のみ。`pending -> processing` の claim はソフトロックで、
///   ディスパッチャ 1 台なら十分だが、2 台が同じ行を読むと両方 claim しうる
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Every user id, in store order.
    async fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError>;

    /// All goals owned by `user_id`, in store order.
    async fn list_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, StoreError>;

    /// Current state of one goal, or `None` if it was deleted.
    async fn get_goal(&self, goal_id: &GoalId) -> Result<Option<Goal>, StoreError>;

    /// Apply a partial update. Returns the updated goal, or `None` when the
    /// goal does not exist or the patch carries no fields.
    ///
    /// A status the current one cannot move to is refused with
    /// [`StoreError::IllegalTransition`].
    async fn update_goal(
        &self,
        goal_id: &GoalId,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, StoreError>;
}
