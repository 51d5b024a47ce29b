//! Repository implementations for entity and association access
//!
//! Repositories borrow the pool and return plain data records; no
//! behavior rides on the rows themselves. The one multi-step write
//! (associate) runs inside a single transaction.

pub mod associations;
pub mod insects;
pub mod trees;

pub use associations::{
    AssociateError, AssociationRepo, InsectRef, InsectSummary, TreeRef, TreeSummary,
    TreeWithInsects,
};
pub use insects::{Insect, InsectHit, InsectListing, InsectProfile, InsectRepo};
pub use trees::{Tree, TreeHit, TreeListing, TreeRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} {id}")]
    NotFound { resource: &'static str, id: i64 },
}
