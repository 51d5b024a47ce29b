//! Schema setup for the observation tables

use sqlx::PgPool;

/// Create the insect and tree tables plus the join table if missing.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS insects (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            fact TEXT,
            territory TEXT,
            millimeters DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trees (
            id BIGSERIAL PRIMARY KEY,
            tree TEXT NOT NULL,
            location TEXT,
            height_ft DOUBLE PRECISION,
            ground_circumference_ft DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The (insect_id, tree_id) pair carries no unique constraint; the
    // associate path checks for an existing edge before inserting.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS insect_trees (
            insect_id BIGINT NOT NULL REFERENCES insects(id) ON DELETE CASCADE,
            tree_id BIGINT NOT NULL REFERENCES trees(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_insects_name ON insects(name)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trees_tree ON trees(tree)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_insect_trees_insect ON insect_trees(insect_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_insect_trees_tree ON insect_trees(tree_id)")
        .execute(pool)
        .await?;

    Ok(())
}
