use reqwest::{
    header::{CACHE_CONTROL, PRAGMA},
    Client,
};
use std::time::Duration;
use url::Url;

use crate::{
    constants::{USER_FETCH_PATH, USER_UPDATE_PATH},
    error::{AppError, Result},
    models::{UserProfile, UserUpdate},
};

/// The two backend calls the mini-app makes.
#[async_trait::async_trait]
pub trait UserApi: Send + Sync {
    async fn fetch_user(&self, id: &str) -> Result<UserProfile>;

    async fn update_user(&self, update: &UserUpdate) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct HttpUserApi {
    base_url: Url,
    client: Client,
}

impl HttpUserApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::BadRequest(format!("invalid API base url: {}", e)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        endpoint_url(&self.base_url, path)
    }
}

// Internal helper that appends `path` to the base URL's own path, so a base
// such as `https://host/miniapp` keeps its prefix.
fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::Internal(format!("API base url {} cannot take a path", base)))?
        .pop_if_empty()
        .extend(path.trim_start_matches('/').split('/'));
    Ok(url)
}

// Internal helper that builds the user-fetch URL with the id as a query parameter.
fn user_fetch_url(endpoint: Url, id: &str) -> Url {
    let mut url = endpoint;
    url.query_pairs_mut().append_pair("id", id);
    url
}

// Internal helper that pulls a `message` out of an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let payload: serde_json::Value = serde_json::from_str(body).ok()?;
    payload
        .get("message")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[async_trait::async_trait]
impl UserApi for HttpUserApi {
    async fn fetch_user(&self, id: &str) -> Result<UserProfile> {
        let url = user_fetch_url(self.endpoint(USER_FETCH_PATH)?, id);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AppError::FetchFailed(format!("status {}", resp.status())));
        }

        resp.json::<UserProfile>()
            .await
            .map_err(|e| AppError::FetchFailed(format!("invalid user payload: {}", e)))
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<()> {
        let url = self.endpoint(USER_UPDATE_PATH)?;

        let resp = self
            .client
            .post(url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::PersistFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| "Failed to save".to_string());
            return Err(AppError::PersistFailed(message));
        }

        Ok(())
    }
}
