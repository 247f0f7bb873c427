//! Catalog domain model.
//!
//! # Responsibility
//! - Define the song record and its write inputs.
//! - Keep field-level invariants next to the data they guard.
//!
//! # Invariants
//! - Deletion is a hard delete; there is no tombstone state.

pub mod song;
