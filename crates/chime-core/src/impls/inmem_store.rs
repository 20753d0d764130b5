//! InMemoryGoalStore - 開発用の GoalStore
//!
//! CLI とテストで DB の代わりに使う。ディスパッチャ自身は使わない
//! API 側の操作（insert / delete）も提供する。
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による排他制御（ロックを跨いで await しない）
//! - 状態遷移は [`GoalStatus::can_transition_to`] で検証
//! - テストビルドでのみ書き込まれた status の履歴を保持

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::{Goal, GoalId, GoalPatch, GoalStatus, StoreError, UserId};
use crate::ports::{Clock, GoalStore, SystemClock};

/// InMemoryGoalStore の内部状態
#[derive(Default)]
struct InMemoryStoreState {
    /// 登録順のユーザー
    users: Vec<UserId>,

    /// 全 Goal レコード（唯一の正本）
    goals: HashMap<GoalId, Goal>,

    /// 登録順の Goal ID（一覧の順序を安定させる）
    order: Vec<GoalId>,

    /// `update_goal` で書き込まれた status（古い順）
    #[cfg(test)]
    transitions: Vec<(GoalId, GoalStatus)>,
}

impl InMemoryStoreState {
    fn has_user(&self, user_id: &UserId) -> bool {
        self.users.iter().any(|u| u == user_id)
    }

    #[cfg(test)]
    fn record_transition(&mut self, goal_id: &GoalId, status: GoalStatus) {
        self.transitions.push((goal_id.clone(), status));
    }

    #[cfg(not(test))]
    fn record_transition(&mut self, _goal_id: &GoalId, _status: GoalStatus) {}
}

/// Mutex で保護された GoalStore（clone はデータを共有）
#[derive(Clone)]
pub struct InMemoryGoalStore {
    state: Arc<Mutex<InMemoryStoreState>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// `updated_at` is stamped from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryStoreState::default())),
            clock,
        }
    }

    /// Register a user. Inserting an existing user is a no-op.
    pub async fn insert_user(&self, user_id: UserId) {
        let mut state = self.state.lock().await;
        if !state.has_user(&user_id) {
            state.users.push(user_id);
        }
    }

    /// Create a goal. The owner must already exist.
    pub async fn insert_goal(&self, goal: Goal) -> Result<Goal, StoreError> {
        let mut state = self.state.lock().await;
        if !state.has_user(&goal.owner_id) {
            return Err(StoreError::UnknownUser(goal.owner_id));
        }
        if state.goals.contains_key(&goal.id) {
            return Err(StoreError::DuplicateGoal(goal.id));
        }
        state.order.push(goal.id.clone());
        state.goals.insert(goal.id.clone(), goal.clone());
        Ok(goal)
    }

    /// Remove a goal, returning it if it existed.
    pub async fn delete_goal(&self, goal_id: &GoalId) -> Option<Goal> {
        let mut state = self.state.lock().await;
        let removed = state.goals.remove(goal_id)?;
        state.order.retain(|id| id != goal_id);
        Some(removed)
    }

    /// Statuses written for `goal_id`, oldest first.
    #[cfg(test)]
    pub(crate) async fn status_history(&self, goal_id: &GoalId) -> Vec<GoalStatus> {
        let state = self.state.lock().await;
        state
            .transitions
            .iter()
            .filter(|(id, _)| id == goal_id)
            .map(|(_, status)| *status)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.goals.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryGoalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.clone())
    }

    async fn list_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.goals.get(id))
            .filter(|goal| &goal.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_goal(&self, goal_id: &GoalId) -> Result<Option<Goal>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.goals.get(goal_id).cloned())
    }

    async fn update_goal(
        &self,
        goal_id: &GoalId,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, StoreError> {
        if patch.is_empty() {
            warn!(goal_id = %goal_id, "no valid fields to update");
            return Ok(None);
        }

        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let Some(goal) = state.goals.get_mut(goal_id) else {
            return Ok(None);
        };
        if let Some(to) = patch.status {
            if !goal.status.can_transition_to(to) {
                return Err(StoreError::IllegalTransition {
                    goal: goal_id.clone(),
                    from: goal.status,
                    to,
                });
            }
        }
        goal.apply(&patch, now);
        let updated = goal.clone();

        if let Some(status) = patch.status {
            state.record_transition(goal_id, status);
        }
        Ok(Some(updated))
    }
}
