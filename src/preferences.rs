use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Companion service holding per-user preference records.
#[async_trait]
pub trait PreferenceClient: Send + Sync {
    async fn create_default(&self, user_id: Uuid) -> anyhow::Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPreference {
    user_id: Uuid,
}

#[derive(Clone)]
pub struct HttpPreferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPreferenceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PreferenceClient for HttpPreferenceClient {
    async fn create_default(&self, user_id: Uuid) -> anyhow::Result<()> {
        let url = format!("{}/api/preference", self.base_url);
        self.client
            .post(&url)
            .json(&NewPreference { user_id })
            .send()
            .await
            .with_context(|| format!("POST {}", url))?
            .error_for_status()
            .context("preference service rejected request")?;
        debug!(%user_id, "default preference created");
        Ok(())
    }
}
