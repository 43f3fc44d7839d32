//! Binds the projection feature files to the step registry.

use crate::fixtures::{ProjectionContext, projection_context};
use rstest_bdd_macros::scenarios;

scenarios!(
    "tests/features/projection.feature",
    fixtures = [projection_context: ProjectionContext]
);
scenarios!(
    "tests/features/validation.feature",
    fixtures = [projection_context: ProjectionContext]
);
