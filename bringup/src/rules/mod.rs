pub mod validator;

pub use validator::{EntityValidator, NO_RAILS_ISSUE, VALIDATION_HEADER};

use crate::model::{ParsedEntities, TestPlan};

/// Convenience wrapper around [`EntityValidator::validate`].
pub fn validate_entities(entities: &ParsedEntities) -> Vec<String> {
    EntityValidator::validate(entities)
}

/// Convenience wrapper around [`EntityValidator::annotate`].
pub fn annotate_plan(plan: TestPlan, issues: &[String]) -> TestPlan {
    EntityValidator::annotate(plan, issues)
}
