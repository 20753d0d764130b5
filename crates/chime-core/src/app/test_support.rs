//! Fakes and a harness for dispatcher tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::builder::DispatcherBuilder;
use super::dispatcher::ReminderDispatcher;
use crate::config::DispatcherConfig;
use crate::domain::{
    DeliveryError, DomainEvent, Goal, GoalId, GoalPatch, GoalStatus, StoreError, UserId,
};
use crate::impls::InMemoryGoalStore;
use crate::ports::{Clock, EventBroadcaster, FixedClock, GoalStore, NotificationSender};

pub(crate) const PHONE: &str = "+15550100";
pub(crate) const DEFAULT_USER: &str = "1";

/// Records every send; answers with a canned result after an optional delay.
pub(crate) struct RecordingSender {
    calls: Mutex<Vec<(String, String)>>,
    result: Result<String, DeliveryError>,
    delay: Option<Duration>,
}

impl RecordingSender {
    pub(crate) fn ok() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            result: Ok("msg-1".to_string()),
            delay: None,
        }
    }

    pub(crate) fn failing(err: DeliveryError) -> Self {
        Self {
            result: Err(err),
            ..Self::ok()
        }
    }

    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::ok()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, DeliveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((phone.to_string(), message.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}

#[derive(Default)]
pub(crate) struct RecordingBroadcaster {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingBroadcaster {
    pub(crate) fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventBroadcaster for RecordingBroadcaster {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Wraps a store and fails selected calls with `StoreError::Unavailable`.
pub(crate) struct FlakyStore {
    inner: InMemoryGoalStore,
    fail_users: bool,
    fail_goals_for: HashSet<UserId>,
    fail_updates: bool,
    fail_outcome_writes: bool,
}

impl FlakyStore {
    pub(crate) fn new(inner: InMemoryGoalStore) -> Self {
        Self {
            inner,
            fail_users: false,
            fail_goals_for: HashSet::new(),
            fail_updates: false,
            fail_outcome_writes: false,
        }
    }

    pub(crate) fn failing_users(mut self) -> Self {
        self.fail_users = true;
        self
    }

    pub(crate) fn failing_goals_for(mut self, user: &str) -> Self {
        self.fail_goals_for.insert(UserId::new(user));
        self
    }

    pub(crate) fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Claims go through; every other update fails.
    pub(crate) fn failing_outcome_writes(mut self) -> Self {
        self.fail_outcome_writes = true;
        self
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl GoalStore for FlakyStore {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        if self.fail_users {
            return Err(unavailable());
        }
        self.inner.list_user_ids().await
    }

    async fn list_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, StoreError> {
        if self.fail_goals_for.contains(user_id) {
            return Err(unavailable());
        }
        self.inner.list_goals(user_id).await
    }

    async fn get_goal(&self, goal_id: &GoalId) -> Result<Option<Goal>, StoreError> {
        self.inner.get_goal(goal_id).await
    }

    async fn update_goal(
        &self,
        goal_id: &GoalId,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, StoreError> {
        if self.fail_updates {
            return Err(unavailable());
        }
        if self.fail_outcome_writes && patch.status != Some(GoalStatus::Processing) {
            return Err(unavailable());
        }
        self.inner.update_goal(goal_id, patch).await
    }
}

/// Lists a fixed snapshot but writes the real store, like a listing taken
/// just before another writer got in. Reads hit the real store unless
/// `with_stale_reads` is set.
pub(crate) struct StaleListingStore {
    inner: InMemoryGoalStore,
    listing: Vec<Goal>,
    stale_reads: bool,
}

impl StaleListingStore {
    pub(crate) fn new(inner: InMemoryGoalStore, listing: Vec<Goal>) -> Self {
        Self {
            inner,
            listing,
            stale_reads: false,
        }
    }

    pub(crate) fn with_stale_reads(mut self) -> Self {
        self.stale_reads = true;
        self
    }
}

#[async_trait]
impl GoalStore for StaleListingStore {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, StoreError> {
        self.inner.list_user_ids().await
    }

    async fn list_goals(&self, user_id: &UserId) -> Result<Vec<Goal>, StoreError> {
        Ok(self
            .listing
            .iter()
            .filter(|goal| &goal.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_goal(&self, goal_id: &GoalId) -> Result<Option<Goal>, StoreError> {
        if self.stale_reads {
            return Ok(self.listing.iter().find(|goal| &goal.id == goal_id).cloned());
        }
        self.inner.get_goal(goal_id).await
    }

    async fn update_goal(
        &self,
        goal_id: &GoalId,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, StoreError> {
        self.inner.update_goal(goal_id, patch).await
    }
}

/// A dispatcher over an in-memory store, a fixed clock and recording fakes.
pub(crate) struct Harness {
    pub(crate) dispatcher: ReminderDispatcher,
    pub(crate) store: InMemoryGoalStore,
    pub(crate) sender: Arc<RecordingSender>,
    pub(crate) events: Arc<RecordingBroadcaster>,
    pub(crate) clock: FixedClock,
    config: DispatcherConfig,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::build(default_now(), RecordingSender::ok()).await
    }

    pub(crate) async fn at(now: DateTime<Utc>) -> Self {
        Self::build(now, RecordingSender::ok()).await
    }

    pub(crate) async fn with_sender(sender: RecordingSender) -> Self {
        Self::build(default_now(), sender).await
    }

    async fn build(now: DateTime<Utc>, sender: RecordingSender) -> Self {
        let clock = FixedClock::new(now);
        let store = InMemoryGoalStore::with_clock(Arc::new(clock.clone()));
        store.insert_user(UserId::new(DEFAULT_USER)).await;
        let sender = Arc::new(sender);
        let events = Arc::new(RecordingBroadcaster::default());
        let config = DispatcherConfig::default();

        let dispatcher = dispatcher_for(
            Arc::new(store.clone()),
            &sender,
            &events,
            &clock,
            config.clone(),
        );
        Self {
            dispatcher,
            store,
            sender,
            events,
            clock,
            config,
        }
    }

    /// Sub-second send timeout; the config only takes whole seconds.
    pub(crate) fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.dispatcher.send_timeout = timeout;
        self
    }

    /// A dispatcher sharing this harness's fakes but reading through `store`.
    pub(crate) fn dispatcher_over(&self, store: Arc<dyn GoalStore>) -> ReminderDispatcher {
        let mut dispatcher = dispatcher_for(
            store,
            &self.sender,
            &self.events,
            &self.clock,
            self.config.clone(),
        );
        dispatcher.send_timeout = self.dispatcher.send_timeout;
        dispatcher
    }

    /// Goal for the default user, due `offset_secs` from now.
    pub(crate) fn goal(&self, id: &str, offset_secs: i64) -> Goal {
        self.goal_for(id, DEFAULT_USER, offset_secs)
    }

    pub(crate) fn goal_for(&self, id: &str, owner: &str, offset_secs: i64) -> Goal {
        let now = self.clock.now();
        Goal::new(
            GoalId::new(id),
            UserId::new(owner),
            format!("goal {id}"),
            now + chrono::Duration::seconds(offset_secs),
            PHONE,
            now,
        )
    }

    pub(crate) async fn add(&self, goal: Goal) {
        self.store.insert_goal(goal).await.unwrap();
    }

    pub(crate) async fn add_for(&self, user: &str, goal: Goal) {
        self.store.insert_user(UserId::new(user)).await;
        self.add(goal).await;
    }

    pub(crate) async fn get(&self, id: &str) -> Goal {
        self.store
            .get_goal(&GoalId::new(id))
            .await
            .unwrap()
            .unwrap()
    }

    pub(crate) async fn status(&self, id: &str) -> GoalStatus {
        self.get(id).await.status
    }
}

fn default_now() -> DateTime<Utc> {
    // Tuesday
    Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
}

fn dispatcher_for(
    store: Arc<dyn GoalStore>,
    sender: &Arc<RecordingSender>,
    events: &Arc<RecordingBroadcaster>,
    clock: &FixedClock,
    config: DispatcherConfig,
) -> ReminderDispatcher {
    DispatcherBuilder::new()
        .store(store)
        .sender(sender.clone())
        .broadcaster(events.clone())
        .clock(Arc::new(clock.clone()))
        .config(config)
        .build()
        .unwrap()
}
