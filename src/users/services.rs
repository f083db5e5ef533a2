use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use super::repo::UserStore;
use crate::storage::StorageClient;

pub const PROFILE_FOLDER: &str = "profile";

/// Object key for a profile image: `{id}-{filename}`.
pub fn profile_key(user_id: Uuid, filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("profile");
    format!("{}-{}", user_id, name)
}

/// Uploads a profile image, then stores its URL on the user row.
/// Nothing is written to the database if the upload fails.
pub async fn upload_profile(
    users: &dyn UserStore,
    storage: &dyn StorageClient,
    user_id: Uuid,
    filename: &str,
    body: Bytes,
    content_type: &str,
) -> anyhow::Result<String> {
    let key = profile_key(user_id, filename);
    let url = storage
        .upload(PROFILE_FOLDER, &key, body, content_type)
        .await
        .with_context(|| format!("upload profile {}", key))?;

    users.set_profile_url(user_id, &url).await?;
    Ok(url)
}
