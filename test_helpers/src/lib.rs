//! Test helpers shared across the config projector crates.
//!
//! This crate provides temporary content trees for projection tests and text
//! normalisation for behavioural step arguments.

pub mod text;
pub mod tree;
