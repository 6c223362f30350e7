//! Database layer
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Schema bootstrap

pub mod models;
mod repository;
mod schema;

pub use repository::{AnimalNode, DoseNode, Repository, StudyTree};
