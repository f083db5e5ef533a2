use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Roaster, RoasterChanges};

#[async_trait]
pub trait RoasterStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Roaster>>;
    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<Roaster>>;
    async fn insert(&self, roaster: &Roaster) -> anyhow::Result<()>;
    async fn update(&self, id: Uuid, changes: &RoasterChanges) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgRoasterStore {
    db: PgPool,
}

impl PgRoasterStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoasterStore for PgRoasterStore {
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Roaster>> {
        let roaster = sqlx::query_as::<_, Roaster>(
            r#"
            SELECT id, name, email, phone, address_line1, address_line2,
                   address_city, address_state, address_zip, address_country
            FROM roasters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(roaster)
    }

    async fn get_all(&self, offset: i64, limit: i64) -> anyhow::Result<Vec<Roaster>> {
        let rows = sqlx::query_as::<_, Roaster>(
            r#"
            SELECT id, name, email, phone, address_line1, address_line2,
                   address_city, address_state, address_zip, address_country
            FROM roasters
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, roaster: &Roaster) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO roasters (id, name, email, phone, address_line1, address_line2,
                                  address_city, address_state, address_zip, address_country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(roaster.id)
        .bind(&roaster.name)
        .bind(&roaster.email)
        .bind(&roaster.phone)
        .bind(&roaster.address_line1)
        .bind(&roaster.address_line2)
        .bind(&roaster.address_city)
        .bind(&roaster.address_state)
        .bind(&roaster.address_zip)
        .bind(&roaster.address_country)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, c: &RoasterChanges) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE roasters SET
                name            = COALESCE($1, name),
                email           = COALESCE($2, email),
                phone           = COALESCE($3, phone),
                address_line1   = COALESCE($4, address_line1),
                address_line2   = COALESCE($5, address_line2),
                address_city    = COALESCE($6, address_city),
                address_state   = COALESCE($7, address_state),
                address_zip     = COALESCE($8, address_zip),
                address_country = COALESCE($9, address_country)
            WHERE id = $10
            "#,
        )
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.address_line1)
        .bind(&c.address_line2)
        .bind(&c.address_city)
        .bind(&c.address_state)
        .bind(&c.address_zip)
        .bind(&c.address_country)
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
