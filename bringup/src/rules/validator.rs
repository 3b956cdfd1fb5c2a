//! Entity set sanity checks
//!
//! Issues are advisory strings. They are attached to the plan notes and never
//! stop generation.

use std::collections::HashSet;

use crate::model::{ParsedEntities, TestPlan};

pub const NO_RAILS_ISSUE: &str = "No rails found; add at least one power rail.";
pub const VALIDATION_HEADER: &str = "Validation Notes:";

pub struct EntityValidator;

impl EntityValidator {
    /// Check an entity set. An empty list means no issues.
    pub fn validate(entities: &ParsedEntities) -> Vec<String> {
        let mut issues = Vec::new();

        if entities.rails.is_empty() {
            issues.push(NO_RAILS_ISSUE.to_string());
        }

        // Identity is the lower-cased name plus the voltage rounded to millivolts.
        let mut seen: HashSet<(String, i64)> = HashSet::new();
        for rail in &entities.rails {
            let key = (rail.name.to_lowercase(), (rail.voltage * 1000.0).round() as i64);
            if !seen.insert(key) {
                issues.push(format!("Duplicate rail entry: {} {:?}V", rail.name, rail.voltage));
            }
        }

        if !issues.is_empty() {
            tracing::info!("Validation found {} issue(s) in '{}'", issues.len(), entities.title);
        }
        issues
    }

    /// Append issues to the plan notes under a fixed header. Steps are untouched.
    pub fn annotate(plan: TestPlan, issues: &[String]) -> TestPlan {
        if issues.is_empty() {
            return plan;
        }
        let body = issues
            .iter()
            .map(|i| format!("- {}", i))
            .collect::<Vec<_>>()
            .join("\n");
        plan.append_notes(VALIDATION_HEADER, &body)
    }
}
