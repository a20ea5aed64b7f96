//! Scenario, determinism and property tests for the battle.
//!
//! - `helpers.rs`: bench and battle setup utilities
//! - `scenarios.rs`: end-to-end behaviour of the frame loop
//! - `determinism.rs`: same seed and inputs give the same battle
//! - `properties.rs`: `proptest` invariants over random seeds and levels

pub(crate) mod helpers;
mod scenarios;
