use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{sleep, Duration};

use crate::constants::{MAX_PLUS_ONE_PER_TAP, PLUS_ONE_X_OFFSET};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TapPosition {
    pub x: f64,
    pub y: f64,
}

/// Transient "+1" marker shown where a tap landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlusOneEffect {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// Live "+1" markers. Each spawned batch removes itself after `lifetime`.
#[derive(Debug, Clone)]
pub struct EffectLayer {
    effects: Arc<Mutex<Vec<PlusOneEffect>>>,
    next_id: Arc<AtomicU64>,
    lifetime: Duration,
}

impl EffectLayer {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            effects: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            lifetime,
        }
    }

    pub fn active(&self) -> Vec<PlusOneEffect> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Adds one marker per touch, spread along x, and schedules their removal.
    /// At most `MAX_PLUS_ONE_PER_TAP` markers are drawn for a single event.
    pub fn spawn(&self, touches: u32, at: TapPosition) -> Vec<PlusOneEffect> {
        let batch: Vec<PlusOneEffect> = (0..touches.min(MAX_PLUS_ONE_PER_TAP))
            .map(|index| PlusOneEffect {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                x: at.x + f64::from(index) * PLUS_ONE_X_OFFSET,
                y: at.y,
            })
            .collect();
        if batch.is_empty() {
            return batch;
        }

        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch.iter().copied());

        let effects = Arc::clone(&self.effects);
        let ids: Vec<u64> = batch.iter().map(|e| e.id).collect();
        let lifetime = self.lifetime;
        tokio::spawn(async move {
            sleep(lifetime).await;
            effects
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|e| !ids.contains(&e.id));
        });

        batch
    }
}
