//! canopy-server: HTTP API for recording insects observed near trees
//!
//! Exposes CRUD routes for trees and insects, nested listings over the
//! join table, and an association endpoint that links the two.

pub mod db;
pub mod http;
pub mod models;

pub use http::{run_server, ServerConfig};
