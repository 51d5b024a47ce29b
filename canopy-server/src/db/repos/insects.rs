//! Insect repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::InsectAttrs;

use super::DbError;

/// Full insect row
#[derive(Debug, Clone, FromRow)]
pub struct Insect {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fact: Option<String>,
    pub territory: Option<String>,
    pub millimeters: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection, ordered by size
#[derive(Debug, Clone, FromRow)]
pub struct InsectListing {
    pub id: i64,
    pub name: String,
    pub millimeters: Option<f64>,
}

/// Search projection
#[derive(Debug, Clone, FromRow)]
pub struct InsectHit {
    pub name: String,
    pub id: i64,
}

/// Projection used by the lazy nested listing
#[derive(Debug, Clone, FromRow)]
pub struct InsectProfile {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

const INSECT_COLUMNS: &str =
    "id, name, description, fact, territory, millimeters, created_at, updated_at";

/// Insect repository
pub struct InsectRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> InsectRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every insect, smallest first.
    pub async fn list(&self) -> Result<Vec<InsectListing>, DbError> {
        let insects = sqlx::query_as(
            "SELECT id, name, millimeters FROM insects ORDER BY millimeters ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(insects)
    }

    /// List every insect alphabetically, with descriptions.
    pub async fn list_by_name(&self) -> Result<Vec<InsectProfile>, DbError> {
        let insects =
            sqlx::query_as("SELECT id, name, description FROM insects ORDER BY name ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(insects)
    }

    /// Get a single insect by id.
    pub async fn get(&self, id: i64) -> Result<Insect, DbError> {
        let insect: Option<Insect> =
            sqlx::query_as(&format!("SELECT {INSECT_COLUMNS} FROM insects WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        insect.ok_or(DbError::NotFound {
            resource: "insect",
            id,
        })
    }

    /// Case-insensitive substring search on name. No match is an
    /// empty vec, never an error.
    pub async fn search(&self, fragment: &str) -> Result<Vec<InsectHit>, DbError> {
        let hits = sqlx::query_as("SELECT name, id FROM insects WHERE name ILIKE $1")
            .bind(format!("%{fragment}%"))
            .fetch_all(self.pool)
            .await?;

        Ok(hits)
    }

    /// Look up an insect by exact name. Used by the seed logic.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Insect>, DbError> {
        let insect =
            sqlx::query_as(&format!("SELECT {INSECT_COLUMNS} FROM insects WHERE name = $1"))
                .bind(name)
                .fetch_optional(self.pool)
                .await?;

        Ok(insect)
    }

    /// Insert a new insect, returning the row with its generated id.
    pub async fn create(&self, attrs: InsectAttrs) -> Result<Insect, DbError> {
        let insect = sqlx::query_as(&format!(
            r#"
            INSERT INTO insects (name, description, fact, territory, millimeters)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {INSECT_COLUMNS}
            "#
        ))
        .bind(&attrs.name)
        .bind(&attrs.description)
        .bind(&attrs.fact)
        .bind(&attrs.territory)
        .bind(attrs.millimeters)
        .fetch_one(self.pool)
        .await?;

        Ok(insect)
    }

    /// Overwrite an insect with the given attributes.
    pub async fn update(&self, id: i64, attrs: InsectAttrs) -> Result<Insect, DbError> {
        let insect: Option<Insect> = sqlx::query_as(&format!(
            r#"
            UPDATE insects
            SET name = $2, description = $3, fact = $4, territory = $5,
                millimeters = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {INSECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&attrs.name)
        .bind(&attrs.description)
        .bind(&attrs.fact)
        .bind(&attrs.territory)
        .bind(attrs.millimeters)
        .fetch_optional(self.pool)
        .await?;

        insect.ok_or(DbError::NotFound {
            resource: "insect",
            id,
        })
    }

    /// Delete an insect. Join rows go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM insects WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "insect",
                id,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::db::migrations;
    use crate::models::InsectDraft;

    // Integration tests - run with DATABASE_URL set:
    // cargo test -p canopy-server -- --ignored

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        pool
    }

    fn attrs(name: &str, millimeters: Option<f64>) -> InsectAttrs {
        InsectDraft {
            name: Some(name.to_owned()),
            millimeters,
            ..Default::default()
        }
        .validate()
        .expect("valid attrs")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_generates_fresh_id() {
        let pool = test_pool().await;
        let repo = InsectRepo::new(&pool);

        let first = repo.create(attrs("Ten Lined June Beetle", Some(25.0))).await.unwrap();
        let second = repo.create(attrs("Emerald Ash Borer", Some(8.5))).await.unwrap();
        assert_ne!(first.id, second.id);

        repo.delete(first.id).await.unwrap();
        repo.delete(second.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn get_absent_id_is_not_found() {
        let pool = test_pool().await;
        let err = InsectRepo::new(&pool).get(i64::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "insect", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_orders_by_millimeters() {
        let pool = test_pool().await;
        let repo = InsectRepo::new(&pool);

        let big = repo.create(attrs("Goliath Beetle", Some(110.0))).await.unwrap();
        let small = repo.create(attrs("Fairyfly", Some(0.2))).await.unwrap();

        let listing = repo.list().await.unwrap();
        let sizes: Vec<f64> = listing.iter().filter_map(|i| i.millimeters).collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));

        repo.delete(big.id).await.unwrap();
        repo.delete(small.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn search_is_substring_and_case_insensitive() {
        let pool = test_pool().await;
        let repo = InsectRepo::new(&pool);

        let moth = repo.create(attrs("Atlas Moth", Some(250.0))).await.unwrap();

        let hits = repo.search("atlas").await.unwrap();
        assert!(hits.iter().any(|h| h.id == moth.id));

        let misses = repo.search("no such insect anywhere").await.unwrap();
        assert!(misses.is_empty());

        repo.delete(moth.id).await.unwrap();
    }
}
