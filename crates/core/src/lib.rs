//! Core business logic for Hearth.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `movement` - Movement ledger: validation, household authorization and debt consolidation

pub mod movement;
