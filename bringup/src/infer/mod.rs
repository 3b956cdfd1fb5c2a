//! Heuristic entity inference
//!
//! Builds an entity set from arbitrary text (BOM rows, PDF hint lines, raw
//! Altium dumps) by substring and regex matching over the upper-cased text.
//! Rules are independent; several may fire for the same input. Output is a
//! pure function of the input text.

pub mod patterns;

use std::collections::HashSet;

use crate::model::{FunctionalTest, Oscillator, ParsedEntities, PowerRail};
use self::patterns::{
    TestTrigger, DEFAULT_RAILS, FALLBACK_TEST, OSCILLATOR_TRIGGERS, RAIL_PATTERNS, TEST_TRIGGERS,
};

pub struct HeuristicInferencer;

impl HeuristicInferencer {
    pub fn infer(text: &str, title: &str) -> ParsedEntities {
        let upper = text.to_uppercase();

        let mut rails = Self::infer_rails(&upper);
        if rails.is_empty() {
            rails = DEFAULT_RAILS
                .iter()
                .map(|(name, voltage)| PowerRail::new(*name, *voltage))
                .collect();
        }

        let oscillators = Self::infer_oscillators(&upper);

        let mut functional_tests = Self::infer_tests(&upper);
        if functional_tests.is_empty() {
            functional_tests.push(to_test(&FALLBACK_TEST));
        }

        tracing::debug!(
            "Inferred {} rails, {} oscillators, {} tests for '{}'",
            rails.len(),
            oscillators.len(),
            functional_tests.len(),
            title
        );

        ParsedEntities {
            title: title.to_string(),
            rails,
            oscillators,
            functional_tests,
        }
    }

    /// One rail per distinct voltage; the first matching pattern names it.
    fn infer_rails(upper: &str) -> Vec<PowerRail> {
        let mut seen: HashSet<u64> = HashSet::new();
        let mut rails = Vec::new();
        for rule in RAIL_PATTERNS.iter() {
            if seen.contains(&rule.voltage.to_bits()) || !rule.pattern.is_match(upper) {
                continue;
            }
            seen.insert(rule.voltage.to_bits());
            rails.push(PowerRail::new(rail_name(rule.voltage), rule.voltage));
        }
        rails
    }

    fn infer_oscillators(upper: &str) -> Vec<Oscillator> {
        OSCILLATOR_TRIGGERS
            .iter()
            .filter(|o| o.triggers.iter().any(|t| upper.contains(t)))
            .map(|o| Oscillator::new(o.reference, o.frequency_hz))
            .collect()
    }

    fn infer_tests(upper: &str) -> Vec<FunctionalTest> {
        TEST_TRIGGERS
            .iter()
            .filter(|t| t.triggers.iter().any(|k| upper.contains(k)))
            .map(to_test)
            .collect()
    }
}

/// `+{voltage}V` with the shortest decimal form: 5.0 -> `+5V`, 3.3 -> `+3.3V`.
pub fn rail_name(voltage: f64) -> String {
    format!("+{}V", voltage)
}

fn to_test(trigger: &TestTrigger) -> FunctionalTest {
    FunctionalTest::new(trigger.name, trigger.command, trigger.expected)
}
