// src/api/mod.rs
//
// Development backend serving the endpoints the mini-app client talks to.

pub mod health;
pub mod user;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::UserProfile;

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub profile: UserProfile,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<RwLock<HashMap<String, StoredUser>>>,
    pub config: Config,
}

impl AppState {
    /// State with the single demo user described by the config.
    pub fn seeded(config: &Config) -> Self {
        let id = config.dev_seed_user_id.clone();
        let profile = UserProfile {
            t_id: id.clone(),
            balance: 0.0,
            total_earned: 0.0,
            earn_per_tap: config.dev_seed_earn_per_tap,
            referal_link: Some(format!("https://t.me/tapminiapp_bot?start={}", id)),
            username: Some("demo".to_string()),
            mount: Some(config.default_tap_budget),
        };

        let mut users = HashMap::new();
        users.insert(
            id,
            StoredUser {
                profile,
                updated_at: Utc::now(),
            },
        );

        Self {
            users: Arc::new(RwLock::new(users)),
            config: config.clone(),
        }
    }
}
