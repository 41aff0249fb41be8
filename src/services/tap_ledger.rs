use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::{
    config::Config,
    error::{AppError, Result},
    integrations::api_client::UserApi,
    models::UserUpdate,
};

use super::plus_one::{EffectLayer, PlusOneEffect, TapPosition};
use super::profile_store::ProfileStore;

/// Debounce state shared between the ledger and its timer/flush tasks.
#[derive(Debug, Default)]
struct SyncState {
    /// Earned since the last confirmed flush.
    accumulated: f64,
    pending_save: bool,
    /// Bumped on every (re)arm; a timer only fires for its own generation.
    generation: u64,
    armed: Option<JoinHandle<()>>,
    confirmed: f64,
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapOutcome {
    pub earned: f64,
    pub balance: f64,
    pub total_earned: f64,
    pub mount: u32,
    pub effects: Vec<PlusOneEffect>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlushReport {
    /// Earnings covered by this flush.
    pub amount: f64,
    pub update: UserUpdate,
}

/// Optimistic tap counter for the play screen.
///
/// Taps are applied to the shared [`ProfileStore`] immediately. Their earnings
/// accumulate until a debounce timer fires, which swaps the accumulator to zero
/// and persists the current profile snapshot through [`UserApi`]. A failed
/// flush puts its amount back and leaves `pending_save` set; the next tap or
/// [`TapLedger::teardown`] tries again.
pub struct TapLedger {
    store: ProfileStore,
    api: Arc<dyn UserApi>,
    effects: EffectLayer,
    sync: Arc<Mutex<SyncState>>,
    earnings: Mutex<f64>,
    debounce: Duration,
    torn_down: AtomicBool,
}

impl TapLedger {
    pub fn new(store: ProfileStore, api: Arc<dyn UserApi>, config: &Config) -> Self {
        Self::with_timings(
            store,
            api,
            Duration::from_millis(config.save_debounce_ms),
            Duration::from_millis(config.plus_one_lifetime_ms),
        )
    }

    pub fn with_timings(
        store: ProfileStore,
        api: Arc<dyn UserApi>,
        debounce: Duration,
        effect_lifetime: Duration,
    ) -> Self {
        Self {
            store,
            api,
            effects: EffectLayer::new(effect_lifetime),
            sync: Arc::new(Mutex::new(SyncState::default())),
            earnings: Mutex::new(0.0),
            debounce,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Earnings collected on this surface since it was created.
    pub fn earnings(&self) -> f64 {
        *self.earnings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pending_save(&self) -> bool {
        lock(&self.sync).pending_save
    }

    pub fn unflushed(&self) -> f64 {
        lock(&self.sync).accumulated
    }

    /// Earnings the backend has acknowledged.
    pub fn confirmed(&self) -> f64 {
        lock(&self.sync).confirmed
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        lock(&self.sync).armed.is_some()
    }

    pub fn effects(&self) -> &EffectLayer {
        &self.effects
    }

    pub fn register_tap(&self, touch_count: u32, at: TapPosition) -> Option<TapOutcome> {
        if self.torn_down.load(Ordering::SeqCst) {
            return None;
        }
        let credit = match self.store.spend_taps(touch_count) {
            Some(credit) => credit,
            None => {
                tracing::debug!(
                    "Tap ignored (touches={}, mount={}, loaded={})",
                    touch_count,
                    self.store.mount(),
                    self.store.is_loaded()
                );
                return None;
            }
        };

        *self.earnings.lock().unwrap_or_else(PoisonError::into_inner) += credit.earned;
        let effects = self.effects.spawn(touch_count, at);
        self.schedule_flush(credit.earned);

        Some(TapOutcome {
            earned: credit.earned,
            balance: credit.profile.balance,
            total_earned: credit.profile.total_earned,
            mount: credit.mount,
            effects,
        })
    }

    fn schedule_flush(&self, earned: f64) {
        let mut sync = lock(&self.sync);
        sync.accumulated += earned;
        sync.pending_save = true;
        sync.generation = sync.generation.wrapping_add(1);
        if let Some(previous) = sync.armed.take() {
            previous.abort();
        }

        let generation = sync.generation;
        let state = Arc::clone(&self.sync);
        let store = self.store.clone();
        let api = Arc::clone(&self.api);
        let delay = self.debounce;

        sync.armed = Some(tokio::spawn(async move {
            sleep(delay).await;
            let amount = {
                let mut sync = lock(&state);
                if sync.generation != generation {
                    return;
                }
                sync.armed = None;
                std::mem::take(&mut sync.accumulated)
            };
            // Own task, so a later rearm cannot abort a request in flight.
            tokio::spawn(async move {
                let _ = flush_snapshot(store, api, state, amount).await;
            });
        }));
    }

    /// Persists the current profile snapshot; `amount` is the share of
    /// earnings this call is responsible for.
    pub async fn flush(&self, amount: f64) -> Result<FlushReport> {
        flush_snapshot(
            self.store.clone(),
            Arc::clone(&self.api),
            Arc::clone(&self.sync),
            amount,
        )
        .await
    }

    /// Saves pending earnings right away instead of waiting for the timer.
    /// Returns `None` when nothing is pending.
    pub async fn save_now(&self) -> Option<Result<FlushReport>> {
        let amount = self.disarm()?;
        Some(self.flush(amount).await)
    }

    /// Leaves the tap surface. With a save pending, cancels the armed timer
    /// and fires one best-effort flush of the current snapshot. Later calls,
    /// and taps after teardown, are no-ops.
    pub fn teardown(&self) -> Option<JoinHandle<()>> {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return None;
        }
        let amount = self.disarm()?;

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("Tap surface dropped outside a runtime; {} left unsaved", amount);
                return None;
            }
        };

        let store = self.store.clone();
        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.sync);
        Some(runtime.spawn(async move {
            if let Err(e) = flush_snapshot(store, api, state, amount).await {
                tracing::warn!("Teardown flush failed: {}", e);
            }
        }))
    }

    /// Cancels the armed timer and takes the unflushed amount, if a save is pending.
    fn disarm(&self) -> Option<f64> {
        let mut sync = lock(&self.sync);
        sync.generation = sync.generation.wrapping_add(1);
        if let Some(armed) = sync.armed.take() {
            armed.abort();
        }
        if !sync.pending_save {
            return None;
        }
        Some(std::mem::take(&mut sync.accumulated))
    }
}

impl Drop for TapLedger {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

async fn persist(store: &ProfileStore, api: &dyn UserApi) -> Result<UserUpdate> {
    let profile = store
        .get()
        .ok_or_else(|| AppError::PersistFailed("no user profile loaded".to_string()))?;
    let update = UserUpdate::from_profile(&profile);
    api.update_user(&update).await?;
    Ok(update)
}

async fn flush_snapshot(
    store: ProfileStore,
    api: Arc<dyn UserApi>,
    sync: Arc<Mutex<SyncState>>,
    amount: f64,
) -> Result<FlushReport> {
    match persist(&store, api.as_ref()).await {
        Ok(update) => {
            let mut state = lock(&sync);
            state.confirmed += amount;
            if state.armed.is_none() && state.accumulated == 0.0 {
                state.pending_save = false;
            }
            tracing::debug!(
                "Saved tap progress for {} (+{}, balance {})",
                update.user_id,
                amount,
                update.balance
            );
            Ok(FlushReport { amount, update })
        }
        Err(e) => {
            let mut state = lock(&sync);
            state.accumulated += amount;
            state.pending_save = true;
            tracing::error!("Error saving to database: {}", e);
            Err(e)
        }
    }
}
