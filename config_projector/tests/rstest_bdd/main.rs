//! `rstest-bdd` behaviour suite for `config_projector`.
//!
//! [`fixtures`] defines the shared scenario state, [`steps`] registers the
//! step implementations and [`scenarios`] binds the `.feature` files.

mod fixtures;
mod scenarios;
mod steps;
