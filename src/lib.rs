//! toxtrack: multi-step data-entry service for toxicology research records
//!
//! A user creates a Study, attaches Animal Models, each with Dose Groups,
//! each with Outcomes, plus free-form key/value metadata at any level.
//! Study data exports as flattened CSV, one row per
//! (AnimalModel, DoseGroup, Outcome) combination.

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod routes;
pub mod services;
pub mod validation;
pub mod vocab;
