//! Tree repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::TreeAttrs;

use super::DbError;

/// Full tree row. The `tree` column holds the tree's name.
#[derive(Debug, Clone, FromRow)]
pub struct Tree {
    pub id: i64,
    pub tree: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub ground_circumference_ft: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection, tallest first
#[derive(Debug, Clone, FromRow)]
pub struct TreeListing {
    pub id: i64,
    pub tree: String,
    pub height_ft: Option<f64>,
}

/// Search projection
#[derive(Debug, Clone, FromRow)]
pub struct TreeHit {
    pub tree: String,
    pub id: i64,
}

const TREE_COLUMNS: &str =
    "id, tree, location, height_ft, ground_circumference_ft, created_at, updated_at";

/// Tree repository
pub struct TreeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TreeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every tree, tallest first.
    pub async fn list(&self) -> Result<Vec<TreeListing>, DbError> {
        let trees =
            sqlx::query_as("SELECT id, tree, height_ft FROM trees ORDER BY height_ft DESC")
                .fetch_all(self.pool)
                .await?;

        Ok(trees)
    }

    /// Get a single tree by id.
    pub async fn get(&self, id: i64) -> Result<Tree, DbError> {
        let tree: Option<Tree> =
            sqlx::query_as(&format!("SELECT {TREE_COLUMNS} FROM trees WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        tree.ok_or(DbError::NotFound {
            resource: "tree",
            id,
        })
    }

    /// Case-insensitive substring search on the tree name.
    pub async fn search(&self, fragment: &str) -> Result<Vec<TreeHit>, DbError> {
        let hits = sqlx::query_as("SELECT tree, id FROM trees WHERE tree ILIKE $1")
            .bind(format!("%{fragment}%"))
            .fetch_all(self.pool)
            .await?;

        Ok(hits)
    }

    /// Look up a tree by exact name. Used by the seed logic.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tree>, DbError> {
        let tree = sqlx::query_as(&format!("SELECT {TREE_COLUMNS} FROM trees WHERE tree = $1"))
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(tree)
    }

    /// Insert a new tree, returning the row with its generated id.
    pub async fn create(&self, attrs: TreeAttrs) -> Result<Tree, DbError> {
        let tree = sqlx::query_as(&format!(
            r#"
            INSERT INTO trees (tree, location, height_ft, ground_circumference_ft)
            VALUES ($1, $2, $3, $4)
            RETURNING {TREE_COLUMNS}
            "#
        ))
        .bind(&attrs.tree)
        .bind(&attrs.location)
        .bind(attrs.height_ft)
        .bind(attrs.ground_circumference_ft)
        .fetch_one(self.pool)
        .await?;

        Ok(tree)
    }

    /// Overwrite a tree with the given attributes.
    pub async fn update(&self, id: i64, attrs: TreeAttrs) -> Result<Tree, DbError> {
        let tree: Option<Tree> = sqlx::query_as(&format!(
            r#"
            UPDATE trees
            SET tree = $2, location = $3, height_ft = $4,
                ground_circumference_ft = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {TREE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&attrs.tree)
        .bind(&attrs.location)
        .bind(attrs.height_ft)
        .bind(attrs.ground_circumference_ft)
        .fetch_optional(self.pool)
        .await?;

        tree.ok_or(DbError::NotFound {
            resource: "tree",
            id,
        })
    }

    /// Delete a tree. Join rows go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM trees WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "tree",
                id,
            });
        }

        Ok(())
    }
}
