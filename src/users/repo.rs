use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::repo_types::{User, UserChanges};

const USER_COLUMNS: &str = "id, pass_hash, first_name, last_name, email, phone, \
     address_line1, address_line2, address_city, address_state, address_zip, address_country, \
     roaster_id, profile_url";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<User>>;
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    /// Applies `changes` to the row; the optional hash update shares the
    /// same transaction as the field update.
    async fn update(&self, id: Uuid, changes: &UserChanges) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
    async fn set_profile_url(&self, id: Uuid, url: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, pass_hash, first_name, last_name, email, phone,
                               address_line1, address_line2, address_city, address_state,
                               address_zip, address_country, roaster_id, profile_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id)
        .bind(&user.pass_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address_line1)
        .bind(&user.address_line2)
        .bind(&user.address_city)
        .bind(&user.address_state)
        .bind(&user.address_zip)
        .bind(&user.address_country)
        .bind(user.roaster_id)
        .bind(&user.profile_url)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, changes: &UserChanges) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        update_fields(&mut *tx, id, changes).await?;
        if let Some(hash) = &changes.pass_hash {
            update_pass_hash(&mut *tx, id, hash).await?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn set_profile_url(&self, id: Uuid, url: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET profile_url = $1 WHERE id = $2")
            .bind(url)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

async fn update_fields<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    c: &UserChanges,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users SET
            first_name      = COALESCE($1, first_name),
            last_name       = COALESCE($2, last_name),
            email           = COALESCE($3, email),
            phone           = COALESCE($4, phone),
            address_line1   = COALESCE($5, address_line1),
            address_line2   = COALESCE($6, address_line2),
            address_city    = COALESCE($7, address_city),
            address_state   = COALESCE($8, address_state),
            address_zip     = COALESCE($9, address_zip),
            address_country = COALESCE($10, address_country),
            roaster_id      = CASE WHEN $11::boolean THEN $12::uuid ELSE roaster_id END,
            profile_url     = COALESCE($13, profile_url)
        WHERE id = $14
        "#,
    )
    .bind(&c.first_name)
    .bind(&c.last_name)
    .bind(&c.email)
    .bind(&c.phone)
    .bind(&c.address_line1)
    .bind(&c.address_line2)
    .bind(&c.address_city)
    .bind(&c.address_state)
    .bind(&c.address_zip)
    .bind(&c.address_country)
    .bind(c.roaster_id.is_some())
    .bind(c.roaster_id.flatten())
    .bind(&c.profile_url)
    .bind(id)
    .execute(executor)
    .await
    .context("update user fields")?;
    Ok(())
}

async fn update_pass_hash<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    pass_hash: &str,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET pass_hash = $1 WHERE id = $2")
        .bind(pass_hash)
        .bind(id)
        .execute(executor)
        .await
        .context("update user password")?;
    Ok(())
}
