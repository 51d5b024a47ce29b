//! Association repository - the insect/tree join table
//!
//! Edge creation resolves both sides and inserts inside one
//! transaction, so a failure partway through cannot leave a
//! half-created pair behind.

use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::models::{InsectAttrs, TreeAttrs};

use super::insects::Insect;
use super::trees::Tree;
use super::DbError;

/// How a caller identifies the tree side of an edge: an existing row
/// by id, or validated attributes for a row to create.
#[derive(Debug, Clone)]
pub enum TreeRef {
    ById(i64),
    New(TreeAttrs),
}

/// Insect-side counterpart of [`TreeRef`].
#[derive(Debug, Clone)]
pub enum InsectRef {
    ById(i64),
    New(InsectAttrs),
}

/// Failure modes for edge creation
#[derive(Debug, thiserror::Error)]
pub enum AssociateError {
    #[error("tree {0} not found")]
    TreeNotFound(i64),

    #[error("insect {0} not found")]
    InsectNotFound(i64),

    #[error("association already exists between {tree} and {insect}")]
    AlreadyLinked { tree: String, insect: String },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Tree with its nested insects, as produced by the eager listing
#[derive(Debug, Clone, PartialEq)]
pub struct TreeWithInsects {
    pub id: i64,
    pub tree: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub insects: Vec<InsectSummary>,
}

/// {id, name} projection nested under each tree
#[derive(Debug, Clone, PartialEq)]
pub struct InsectSummary {
    pub id: i64,
    pub name: String,
}

/// {id, tree} projection returned by the per-insect lookup
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TreeSummary {
    pub id: i64,
    pub tree: String,
}

/// One flattened row of the eager join
#[derive(Debug, Clone, FromRow)]
struct EagerRow {
    tree_id: i64,
    tree: String,
    location: Option<String>,
    height_ft: Option<f64>,
    insect_id: i64,
    insect_name: String,
}

/// Association repository
pub struct AssociationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AssociationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Link a tree and an insect, creating either side when attributes
    /// rather than an id were supplied.
    ///
    /// The whole resolve-check-insert sequence runs in one transaction:
    /// any failure rolls back, including the duplicate-edge case, so no
    /// freshly created tree or insect outlives a failed link.
    pub async fn associate(
        &self,
        tree_ref: TreeRef,
        insect_ref: InsectRef,
    ) -> Result<(Tree, Insect), AssociateError> {
        let mut tx = self.pool.begin().await?;

        let tree = match tree_ref {
            TreeRef::ById(id) => find_tree(&mut tx, id)
                .await?
                .ok_or(AssociateError::TreeNotFound(id))?,
            TreeRef::New(attrs) => insert_tree(&mut tx, attrs).await?,
        };

        let insect = match insect_ref {
            InsectRef::ById(id) => find_insect(&mut tx, id)
                .await?
                .ok_or(AssociateError::InsectNotFound(id))?,
            InsectRef::New(attrs) => insert_insect(&mut tx, attrs).await?,
        };

        let (linked,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM insect_trees WHERE tree_id = $1 AND insect_id = $2)",
        )
        .bind(tree.id)
        .bind(insect.id)
        .fetch_one(&mut *tx)
        .await?;

        if linked {
            return Err(AssociateError::AlreadyLinked {
                tree: tree.tree,
                insect: insect.name,
            });
        }

        sqlx::query("INSERT INTO insect_trees (tree_id, insect_id) VALUES ($1, $2)")
            .bind(tree.id)
            .bind(insect.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((tree, insect))
    }

    /// Whether the edge already exists.
    pub async fn exists(&self, tree_id: i64, insect_id: i64) -> Result<bool, DbError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM insect_trees WHERE tree_id = $1 AND insect_id = $2)",
        )
        .bind(tree_id)
        .bind(insect_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Insert the edge row without any duplicate check. Callers that
    /// need the check go through [`associate`](Self::associate).
    pub async fn link(&self, tree_id: i64, insect_id: i64) -> Result<(), DbError> {
        sqlx::query("INSERT INTO insect_trees (tree_id, insect_id) VALUES ($1, $2)")
            .bind(tree_id)
            .bind(insect_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove the edge row. Removing an absent edge is a no-op.
    pub async fn unlink(&self, tree_id: i64, insect_id: i64) -> Result<(), DbError> {
        sqlx::query("DELETE FROM insect_trees WHERE tree_id = $1 AND insect_id = $2")
            .bind(tree_id)
            .bind(insect_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Every tree that has at least one insect near it, tallest first,
    /// with its insects nested alphabetically. Trees without insects
    /// never appear: the join is inner on both sides.
    pub async fn trees_with_insects(&self) -> Result<Vec<TreeWithInsects>, DbError> {
        // The id tiebreaker keeps rows for equal-height trees adjacent
        // so the grouping below can rely on adjacency alone.
        let rows: Vec<EagerRow> = sqlx::query_as(
            r#"
            SELECT t.id AS tree_id, t.tree, t.location, t.height_ft,
                   i.id AS insect_id, i.name AS insect_name
            FROM trees t
            JOIN insect_trees it ON it.tree_id = t.id
            JOIN insects i ON i.id = it.insect_id
            ORDER BY t.height_ft DESC, t.id, i.name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(group_eager_rows(rows))
    }

    /// Trees near one insect, alphabetical by tree name. Issued once
    /// per insect by the lazy nested listing.
    pub async fn trees_for_insect(&self, insect_id: i64) -> Result<Vec<TreeSummary>, DbError> {
        let trees = sqlx::query_as(
            r#"
            SELECT t.id, t.tree
            FROM trees t
            JOIN insect_trees it ON it.tree_id = t.id
            WHERE it.insect_id = $1
            ORDER BY t.tree ASC
            "#,
        )
        .bind(insect_id)
        .fetch_all(self.pool)
        .await?;

        Ok(trees)
    }
}

/// Fold adjacent rows for the same tree into one nested record.
fn group_eager_rows(rows: Vec<EagerRow>) -> Vec<TreeWithInsects> {
    let mut grouped: Vec<TreeWithInsects> = Vec::new();

    for row in rows {
        let insect = InsectSummary {
            id: row.insect_id,
            name: row.insect_name,
        };
        match grouped.last_mut() {
            Some(last) if last.id == row.tree_id => last.insects.push(insect),
            _ => grouped.push(TreeWithInsects {
                id: row.tree_id,
                tree: row.tree,
                location: row.location,
                height_ft: row.height_ft,
                insects: vec![insect],
            }),
        }
    }

    grouped
}

async fn find_tree(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<Option<Tree>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, tree, location, height_ft, ground_circumference_ft, created_at, updated_at \
         FROM trees WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

async fn insert_tree(tx: &mut Transaction<'_, Postgres>, attrs: TreeAttrs) -> Result<Tree, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO trees (tree, location, height_ft, ground_circumference_ft)
        VALUES ($1, $2, $3, $4)
        RETURNING id, tree, location, height_ft, ground_circumference_ft, created_at, updated_at
        "#,
    )
    .bind(&attrs.tree)
    .bind(&attrs.location)
    .bind(attrs.height_ft)
    .bind(attrs.ground_circumference_ft)
    .fetch_one(&mut **tx)
    .await
}

async fn find_insect(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> Result<Option<Insect>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, description, fact, territory, millimeters, created_at, updated_at \
         FROM insects WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
}

async fn insert_insect(
    tx: &mut Transaction<'_, Postgres>,
    attrs: InsectAttrs,
) -> Result<Insect, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO insects (name, description, fact, territory, millimeters)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, fact, territory, millimeters, created_at, updated_at
        "#,
    )
    .bind(&attrs.name)
    .bind(&attrs.description)
    .bind(&attrs.fact)
    .bind(&attrs.territory)
    .bind(attrs.millimeters)
    .fetch_one(&mut **tx)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        tree_id: i64,
        tree: &str,
        height_ft: f64,
        insect_id: i64,
        insect_name: &str,
    ) -> EagerRow {
        EagerRow {
            tree_id,
            tree: tree.to_owned(),
            location: None,
            height_ft: Some(height_ft),
            insect_id,
            insect_name: insect_name.to_owned(),
        }
    }

    #[test]
    fn grouping_nests_adjacent_rows() {
        let rows = vec![
            row(1, "General Sherman", 274.9, 10, "Patu Digua Spider"),
            row(1, "General Sherman", 274.9, 11, "Western Pygmy Blue Butterfly"),
            row(2, "Stagg", 243.0, 11, "Western Pygmy Blue Butterfly"),
        ];

        let grouped = group_eager_rows(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].tree, "General Sherman");
        assert_eq!(grouped[0].insects.len(), 2);
        assert_eq!(grouped[1].tree, "Stagg");
        assert_eq!(grouped[1].insects.len(), 1);
    }

    #[test]
    fn grouping_preserves_row_order() {
        let rows = vec![
            row(5, "Hyperion", 380.1, 2, "Ant"),
            row(5, "Hyperion", 380.1, 3, "Beetle"),
            row(4, "Lincoln", 255.8, 2, "Ant"),
        ];

        let grouped = group_eager_rows(rows);
        assert_eq!(grouped[0].id, 5);
        assert_eq!(
            grouped[0]
                .insects
                .iter()
                .map(|i| i.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Ant", "Beetle"]
        );
        assert_eq!(grouped[1].id, 4);
    }

    #[test]
    fn grouping_empty_input() {
        assert!(group_eager_rows(Vec::new()).is_empty());
    }

    #[test]
    fn equal_heights_do_not_merge_distinct_trees() {
        let rows = vec![
            row(7, "Twin A", 100.0, 1, "Ant"),
            row(8, "Twin B", 100.0, 1, "Ant"),
        ];

        let grouped = group_eager_rows(rows);
        assert_eq!(grouped.len(), 2);
    }

    // Integration tests - run with DATABASE_URL set:
    // cargo test -p canopy-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_edge_is_rejected_and_not_inserted() {
        use crate::db::{create_pool, migrations, InsectRepo, TreeRepo};
        use crate::models::{InsectDraft, TreeDraft};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");

        let repo = AssociationRepo::new(&pool);
        let tree_attrs = TreeDraft {
            name: Some("Grizzly Giant".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let insect_attrs = InsectDraft {
            name: Some("Carpenter Ant".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        let (tree, insect) = repo
            .associate(TreeRef::New(tree_attrs), InsectRef::New(insect_attrs))
            .await
            .unwrap();

        let err = repo
            .associate(TreeRef::ById(tree.id), InsectRef::ById(insect.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AssociateError::AlreadyLinked { .. }));
        assert!(repo.exists(tree.id, insect.id).await.unwrap());

        // Cascade delete clears the join row with the parents.
        TreeRepo::new(&pool).delete(tree.id).await.unwrap();
        InsectRepo::new(&pool).delete(insect.id).await.unwrap();
    }
}
