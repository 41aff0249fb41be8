use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod client;
mod config;
mod constants;
mod error;
mod integrations;
mod models;
mod services;

use config::Config;
use constants::{USER_FETCH_PATH, USER_UPDATE_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tap_miniapp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("serve") => serve(config).await,
        Some("play") | None => {
            let user_id = user_id_from_args(&args).or_else(|| std::env::var("USER_ID").ok());
            client::run(config, user_id).await
        }
        Some(other) => anyhow::bail!("unknown command '{}'; expected 'play' or 'serve'", other),
    }
}

// `--id <value>` or `--id=<value>`
fn user_id_from_args(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--id" {
            return iter.next().cloned();
        }
        if let Some(value) = arg.strip_prefix("--id=") {
            return Some(value.to_string());
        }
    }
    None
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting tap mini-app dev backend");
    tracing::info!("Environment: {}", config.environment);
    if !config.is_development() {
        tracing::warn!("Dev backend keeps users in memory; do not run it in {}", config.environment);
    }

    let state = api::AppState::seeded(&config);
    tracing::info!("Seeded user id: {}", config.dev_seed_user_id);

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route(USER_FETCH_PATH, get(api::user::get_user))
        .route(USER_UPDATE_PATH, post(api::user::update_user))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
