//! Markdown rendering of a test plan
//!
//! Headers are emitted on every change of section between consecutive steps.

use crate::model::{Section, TestPlan};

pub fn render_markdown(plan: &TestPlan) -> String {
    let mut lines: Vec<String> = vec![format!("# {}", plan.title), String::new()];
    let mut current: Option<Section> = None;

    for step in &plan.steps {
        if current != Some(step.section) {
            lines.push(format!("## {}", step.section));
            current = Some(step.section);
        }
        lines.push(format!("**{}. {}**", step.id, step.description));
        if let Some(equipment) = step.equipment.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("- Equipment: {}", equipment));
        }
        if let Some(expected) = step.expected.as_deref().filter(|e| !e.is_empty()) {
            lines.push(format!("- Expected: {}", expected));
        }
        lines.push(String::new());
    }

    if let Some(notes) = plan.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push("---".to_string());
        lines.push("### Notes".to_string());
        lines.push(notes.to_string());
    }

    lines.join("\n")
}

/// Document written to disk: the rendered plan, or its notes alone when the
/// plan has no steps.
pub fn render_document(plan: &TestPlan) -> String {
    if plan.steps.is_empty() {
        plan.notes.clone().unwrap_or_default()
    } else {
        render_markdown(plan)
    }
}

impl TestPlan {
    pub fn to_markdown(&self) -> String {
        render_markdown(self)
    }
}
