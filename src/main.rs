mod app;
mod auth;
mod config;
mod error;
mod preferences;
mod response;
mod roasters;
mod state;
mod storage;
mod users;

#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "towncenter=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = state::connect(&config).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let app_state = AppState::init(&config, db).await?;
    tracing::info!(enforce_tokens = app_state.enforce_tokens, "state ready");

    app::serve(app::build_app(app_state), &config.bind_addr).await
}
