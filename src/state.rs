use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    auth::jwt::TokenIssuer,
    config::AppConfig,
    preferences::{HttpPreferenceClient, PreferenceClient},
    roasters::repo::{PgRoasterStore, RoasterStore},
    storage::{Storage, StorageClient},
    users::repo::{PgUserStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub roasters: Arc<dyn RoasterStore>,
    pub storage: Arc<dyn StorageClient>,
    pub preferences: Arc<dyn PreferenceClient>,
    pub tokens: Arc<TokenIssuer>,
    /// Mutating routes require a token when set.
    pub enforce_tokens: bool,
}

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

impl AppState {
    pub async fn init(config: &AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let storage = Arc::new(
            Storage::new(&config.storage)
                .await
                .context("init object storage")?,
        ) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgRoasterStore::new(db)),
            storage,
            Arc::new(HttpPreferenceClient::new(&config.preference_url)),
            Arc::new(TokenIssuer::new(&config.jwt)),
            config.jwt.enforce,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        roasters: Arc<dyn RoasterStore>,
        storage: Arc<dyn StorageClient>,
        preferences: Arc<dyn PreferenceClient>,
        tokens: Arc<TokenIssuer>,
        enforce_tokens: bool,
    ) -> Self {
        Self {
            users,
            roasters,
            storage,
            preferences,
            tokens,
            enforce_tokens,
        }
    }
}
