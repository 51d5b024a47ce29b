//! Domain input types with validation at construction
//!
//! Request bodies deserialize into drafts; a draft only becomes
//! persistable attributes after `validate()`, which reports every
//! failing field rather than stopping at the first.

pub mod insect;
pub mod tree;
pub mod validation;

pub use insect::{InsectAttrs, InsectDraft};
pub use tree::{TreeAttrs, TreeDraft};
pub use validation::{ValidationError, ValidationErrors};
