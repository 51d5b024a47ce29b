//! Database layer - connection pool, schema setup, seed data, repositories
//!
//! # Design Principles
//!
//! - Shared connection pool, no per-request connections
//! - Nested listings use a single JOIN where the shape allows it
//! - The associate path runs its multi-step write in one transaction

pub mod migrations;
pub mod pool;
pub mod repos;
pub mod seed;

pub use pool::create_pool;
pub use repos::*;
