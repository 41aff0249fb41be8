use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::UserProfile;

/// A change to the shared profile.
///
/// The patch's earnings (`credit` plus `taps_used × earnPerTap`) are added to
/// `balance` and `total_earned` together, so the two fields can never be
/// observed out of sync.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfilePatch {
    pub credit: f64,
    pub taps_used: u32,
}

impl ProfilePatch {
    /// Spends `touch_count` taps at the profile's current rate.
    pub fn taps(touch_count: u32) -> Self {
        Self {
            credit: 0.0,
            taps_used: touch_count,
        }
    }
}

/// Result of a patch accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPatch {
    pub earned: f64,
    pub profile: UserProfile,
    pub mount: u32,
}

#[derive(Debug, Default)]
struct StoreState {
    profile: Option<UserProfile>,
    mount: u32,
}

/// Shared, cross-screen user profile plus the remaining tap budget (`mount`).
///
/// Cloning hands out another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    inner: Arc<RwLock<StoreState>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    pub fn mount(&self) -> u32 {
        self.read().mount
    }

    pub fn is_loaded(&self) -> bool {
        self.read().profile.is_some()
    }

    /// Installs a freshly fetched profile. The tap budget comes from the
    /// profile when present, otherwise from `default_mount`.
    pub fn load(&self, profile: UserProfile, default_mount: u32) {
        let mut state = self.write();
        state.mount = profile.mount.unwrap_or(default_mount);
        state.profile = Some(profile);
    }

    #[cfg(test)]
    pub fn set_mount(&self, mount: u32) {
        self.write().mount = mount;
    }

    /// Drops the profile and its budget.
    pub fn clear(&self) {
        let mut state = self.write();
        state.profile = None;
        state.mount = 0;
    }

    /// Applies `patch` in one write; returns what changed, or `None` (and
    /// changes nothing) when no profile is loaded or the patch spends taps
    /// while the budget is exhausted.
    pub fn set(&self, patch: ProfilePatch) -> Option<AppliedPatch> {
        let mut guard = self.write();
        let state = &mut *guard;
        if patch.taps_used > 0 && state.mount == 0 {
            return None;
        }
        let profile = state.profile.as_mut()?;

        let earned = patch.credit + f64::from(patch.taps_used) * profile.earn_per_tap;
        profile.balance += earned;
        profile.total_earned += earned;
        let profile = profile.clone();
        state.mount = state.mount.saturating_sub(patch.taps_used);

        Some(AppliedPatch {
            earned,
            profile,
            mount: state.mount,
        })
    }

    /// Credits a tap event of `touch_count` touches. A zero count is a no-op.
    pub fn spend_taps(&self, touch_count: u32) -> Option<AppliedPatch> {
        if touch_count == 0 {
            return None;
        }
        self.set(ProfilePatch::taps(touch_count))
    }
}

#[cfg(test)]
pub(crate) fn sample_profile(balance: f64, earn_per_tap: f64) -> UserProfile {
    UserProfile {
        t_id: "42".to_string(),
        balance,
        total_earned: balance,
        earn_per_tap,
        referal_link: Some("https://t.me/tapbot?start=42".to_string()),
        username: None,
        mount: None,
    }
}
