use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    integrations::api_client::UserApi,
    models::UserProfile,
};

use super::navigation::{Navigator, Screen};
use super::profile_store::ProfileStore;

/// Loads the user named by the launch parameters and opens the play screen.
pub struct UserDataFetcher {
    api: Arc<dyn UserApi>,
    store: ProfileStore,
    navigator: Navigator,
    default_mount: u32,
}

impl UserDataFetcher {
    pub fn new(
        api: Arc<dyn UserApi>,
        store: ProfileStore,
        navigator: Navigator,
        default_mount: u32,
    ) -> Self {
        Self {
            api,
            store,
            navigator,
            default_mount,
        }
    }

    pub async fn load(&self, id: Option<&str>) -> Result<UserProfile> {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::MissingIdentifier)?;

        let profile = match self.api.fetch_user(id).await {
            Ok(profile) => profile,
            Err(e) => {
                // never leave another user's profile behind
                self.store.clear();
                return Err(e);
            }
        };
        tracing::info!(
            "Loaded user {} (balance {}, earn/tap {})",
            profile.t_id,
            profile.balance,
            profile.earn_per_tap
        );
        self.store.load(profile.clone(), self.default_mount);
        Ok(profile)
    }

    /// Fetches the user and navigates to the play screen. Failures are logged
    /// and leave the user on the current screen.
    pub async fn enter(&self, id: Option<&str>) -> bool {
        match self.load(id).await {
            Ok(_) => {
                self.navigator.push(Screen::Play);
                true
            }
            Err(AppError::MissingIdentifier) => {
                tracing::error!("No ID provided");
                false
            }
            Err(e) => {
                tracing::error!("Error fetching user data: {}", e);
                false
            }
        }
    }
}
