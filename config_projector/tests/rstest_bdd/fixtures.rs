//! Shared fixtures for the projection behaviour scenarios.

use config_projector::{ConfigBundle, Manifest, ProjectionResult};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use test_helpers::tree::ContentTree;

/// Scenario state shared between projection steps.
#[derive(Debug, Default, ScenarioState)]
pub struct ProjectionContext {
    /// Content root populated by `given` steps.
    pub tree: Slot<ContentTree>,
    /// Manifest source entries in flow-mapping YAML, in declaration order.
    pub sources: Slot<Vec<String>>,
    /// Outcome of loading the manifest.
    pub loaded: Slot<ProjectionResult<Manifest>>,
    /// Outcome of projecting the manifest.
    pub projected: Slot<ProjectionResult<ConfigBundle>>,
}

/// Creates an empty projection context.
#[fixture]
pub fn projection_context() -> ProjectionContext {
    ProjectionContext::default()
}
