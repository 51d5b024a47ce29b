//! Starter dataset for development databases
//!
//! Two insects, four giant sequoias, and the observations linking
//! them. `run` inserts whatever is missing; `undo` removes the edges
//! first and then the rows, so it can reverse a partial apply.

use sqlx::PgPool;

use crate::models::{InsectAttrs, TreeAttrs};

use super::repos::{AssociationRepo, DbError, InsectRepo, TreeRepo};

struct SeedInsect {
    name: &'static str,
    description: &'static str,
    fact: &'static str,
    territory: &'static str,
    millimeters: f64,
}

struct SeedTree {
    tree: &'static str,
    location: &'static str,
    height_ft: f64,
    ground_circumference_ft: f64,
}

impl SeedInsect {
    fn attrs(&self) -> InsectAttrs {
        InsectAttrs {
            name: self.name.to_owned(),
            description: Some(self.description.to_owned()),
            fact: Some(self.fact.to_owned()),
            territory: Some(self.territory.to_owned()),
            millimeters: Some(self.millimeters),
        }
    }
}

impl SeedTree {
    fn attrs(&self) -> TreeAttrs {
        TreeAttrs {
            tree: self.tree.to_owned(),
            location: Some(self.location.to_owned()),
            height_ft: Some(self.height_ft),
            ground_circumference_ft: Some(self.ground_circumference_ft),
        }
    }
}

const INSECTS: &[SeedInsect] = &[
    SeedInsect {
        name: "Western Pygmy Blue Butterfly",
        description: "Among the smallest butterflies in the world",
        fact: "Wingspans reach just under two centimeters.",
        territory: "Western United States",
        millimeters: 12.0,
    },
    SeedInsect {
        name: "Patu Digua Spider",
        description: "Among the smallest spiders in the world",
        fact: "Males are smaller than females.",
        territory: "Rio Digua, Colombia",
        millimeters: 0.37,
    },
];

const TREES: &[SeedTree] = &[
    SeedTree {
        tree: "General Sherman",
        location: "Sequoia National Park",
        height_ft: 274.9,
        ground_circumference_ft: 102.6,
    },
    SeedTree {
        tree: "General Grant",
        location: "Kings Canyon National Park",
        height_ft: 268.1,
        ground_circumference_ft: 107.5,
    },
    SeedTree {
        tree: "Lincoln",
        location: "Sequoia National Park",
        height_ft: 255.8,
        ground_circumference_ft: 98.3,
    },
    SeedTree {
        tree: "Stagg",
        location: "Alder Creek Grove",
        height_ft: 243.0,
        ground_circumference_ft: 109.0,
    },
];

/// (insect name, tree name) observation pairs
const LINKS: &[(&str, &str)] = &[
    ("Western Pygmy Blue Butterfly", "General Sherman"),
    ("Western Pygmy Blue Butterfly", "General Grant"),
    ("Western Pygmy Blue Butterfly", "Lincoln"),
    ("Western Pygmy Blue Butterfly", "Stagg"),
    ("Patu Digua Spider", "Stagg"),
];

/// Apply the starter dataset, skipping rows and edges already present.
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Seeding starter dataset...");

    let insects = InsectRepo::new(pool);
    let trees = TreeRepo::new(pool);
    let associations = AssociationRepo::new(pool);

    for seed in INSECTS {
        if insects.find_by_name(seed.name).await?.is_none() {
            insects.create(seed.attrs()).await?;
        }
    }

    for seed in TREES {
        if trees.find_by_name(seed.tree).await?.is_none() {
            trees.create(seed.attrs()).await?;
        }
    }

    for (insect_name, tree_name) in LINKS {
        let Some(insect) = insects.find_by_name(insect_name).await? else {
            continue;
        };
        let Some(tree) = trees.find_by_name(tree_name).await? else {
            continue;
        };
        if !associations.exists(tree.id, insect.id).await? {
            associations.link(tree.id, insect.id).await?;
        }
    }

    tracing::info!("Seed complete");
    Ok(())
}

/// Remove the starter dataset: edges first, then the rows.
///
/// Missing rows or edges are skipped, so a partial apply reverses
/// cleanly.
pub async fn undo(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Removing starter dataset...");

    let insects = InsectRepo::new(pool);
    let trees = TreeRepo::new(pool);
    let associations = AssociationRepo::new(pool);

    for (insect_name, tree_name) in LINKS {
        if let (Some(insect), Some(tree)) = (
            insects.find_by_name(insect_name).await?,
            trees.find_by_name(tree_name).await?,
        ) {
            associations.unlink(tree.id, insect.id).await?;
        }
    }

    for seed in INSECTS {
        if let Some(row) = insects.find_by_name(seed.name).await? {
            insects.delete(row.id).await?;
        }
    }

    for seed in TREES {
        if let Some(row) = trees.find_by_name(seed.tree).await? {
            trees.delete(row.id).await?;
        }
    }

    tracing::info!("Starter dataset removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_link_names_seeded_rows() {
        for (insect_name, tree_name) in LINKS {
            assert!(INSECTS.iter().any(|i| i.name == *insect_name));
            assert!(TREES.iter().any(|t| t.tree == *tree_name));
        }
    }

    #[test]
    fn seed_attrs_are_complete() {
        for seed in INSECTS {
            let attrs = seed.attrs();
            assert!(!attrs.name.is_empty());
            assert!(attrs.millimeters.is_some_and(|mm| mm > 0.0));
        }
        for seed in TREES {
            let attrs = seed.attrs();
            assert!(!attrs.tree.is_empty());
            assert!(attrs.height_ft.is_some_and(|h| h > 0.0));
        }
    }

    // Integration test - run with DATABASE_URL set:
    // cargo test -p canopy-server -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn seed_applies_and_reverses() {
        use crate::db::{create_pool, migrations};

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");

        run(&pool).await.expect("seed failed");

        let butterfly = InsectRepo::new(&pool)
            .find_by_name("Western Pygmy Blue Butterfly")
            .await
            .unwrap()
            .expect("butterfly seeded");
        let trees = AssociationRepo::new(&pool)
            .trees_for_insect(butterfly.id)
            .await
            .unwrap();
        assert_eq!(trees.len(), 4);

        // Running again adds nothing.
        run(&pool).await.expect("second seed failed");
        let trees_again = AssociationRepo::new(&pool)
            .trees_for_insect(butterfly.id)
            .await
            .unwrap();
        assert_eq!(trees_again.len(), 4);

        undo(&pool).await.expect("undo failed");
        assert!(InsectRepo::new(&pool)
            .find_by_name("Western Pygmy Blue Butterfly")
            .await
            .unwrap()
            .is_none());
    }
}
