use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::{UpdateUserResponse, UserProfile, UserUpdate},
};

use super::AppState;

const STALE_UPDATE_MESSAGE: &str = "Stale update ignored";

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub id: Option<String>,
}

/// GET /api/user?id=
pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserProfile>> {
    let id = query
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AppError::MissingIdentifier)?;

    let users = state.users.read().await;
    let stored = users
        .get(id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    tracing::debug!("Serving user {} (last saved {})", id, stored.updated_at);

    Ok(Json(stored.profile.clone()))
}

// Internal helper that rejects values no client should ever send.
fn validate_update(req: &UserUpdate) -> Result<()> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::MissingIdentifier);
    }
    for (field, value) in [("balance", req.balance), ("totalEarned", req.total_earned)] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::BadRequest(format!(
                "{} must be a non-negative number",
                field
            )));
        }
    }
    Ok(())
}

/// POST /api/updateUser
pub async fn update_user(
    State(state): State<AppState>,
    Json(req): Json<UserUpdate>,
) -> Result<Json<UpdateUserResponse>> {
    validate_update(&req)?;

    let mut users = state.users.write().await;
    let stored = users
        .get_mut(&req.user_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // totalEarned only grows; a smaller value is an out-of-order flush whose
    // progress a newer snapshot already carries.
    if req.total_earned < stored.profile.total_earned {
        tracing::warn!(
            "Ignored stale update for {} ({} < {})",
            req.user_id,
            req.total_earned,
            stored.profile.total_earned
        );
        return Ok(Json(UpdateUserResponse {
            success: true,
            message: Some(STALE_UPDATE_MESSAGE.to_string()),
        }));
    }

    stored.profile.balance = req.balance;
    stored.profile.total_earned = req.total_earned;
    stored.updated_at = Utc::now();
    tracing::debug!(
        "Updated user {}: balance={}, totalEarned={}",
        req.user_id,
        req.balance,
        req.total_earned
    );

    Ok(Json(UpdateUserResponse {
        success: true,
        message: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> AppState {
        AppState::seeded(&Config::for_tests())
    }

    fn update(user_id: &str, balance: f64, total_earned: f64) -> UserUpdate {
        UserUpdate {
            user_id: user_id.to_string(),
            balance,
            total_earned,
        }
    }

    #[tokio::test]
    async fn get_user_requires_id() {
        let result = get_user(State(state()), Query(UserQuery { id: None })).await;
        assert!(matches!(result, Err(AppError::MissingIdentifier)));
    }

    #[tokio::test]
    async fn get_user_returns_seeded_profile() {
        let Json(profile) = get_user(
            State(state()),
            Query(UserQuery {
                id: Some("1001".to_string()),
            }),
        )
        .await
        .expect("seeded user");
        assert_eq!(profile.t_id, "1001");
        assert_eq!(profile.mount, Some(Config::for_tests().default_tap_budget));
    }

    #[tokio::test]
    async fn update_user_persists_values() {
        let state = state();
        update_user(State(state.clone()), Json(update("1001", 12.0, 12.0)))
            .await
            .expect("accepted");

        let users = state.users.read().await;
        let stored = users.get("1001").expect("seeded");
        assert_eq!(stored.profile.balance, 12.0);
        assert_eq!(stored.profile.total_earned, 12.0);
    }

    #[tokio::test]
    async fn stale_total_is_acknowledged_without_rollback() {
        let state = state();
        update_user(State(state.clone()), Json(update("1001", 20.0, 20.0)))
            .await
            .expect("accepted");

        let Json(response) = update_user(State(state.clone()), Json(update("1001", 15.0, 15.0)))
            .await
            .expect("stale write is not an error");
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some(STALE_UPDATE_MESSAGE));

        let users = state.users.read().await;
        assert_eq!(users["1001"].profile.balance, 20.0);
        assert_eq!(users["1001"].profile.total_earned, 20.0);
    }

    #[tokio::test]
    async fn update_user_rejects_bad_numbers_and_unknown_users() {
        let result = update_user(State(state()), Json(update("1001", f64::NAN, 1.0))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = update_user(State(state()), Json(update("1001", 1.0, -1.0))).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = update_user(State(state()), Json(update("ghost", 1.0, 1.0))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
