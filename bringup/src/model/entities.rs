//! Entity set extracted from design inputs
//!
//! `ParsedEntities` is the single handoff object between ingestion and plan
//! generation. Every extractor (netlist parser, heuristic inferencer, entity
//! JSON) produces one of these.

use serde::Serialize;

pub const DEFAULT_TITLE: &str = "Untitled Board";
pub const DEFAULT_RAIL_TOLERANCE_MV: u32 = 100;
pub const DEFAULT_OSC_TOLERANCE_HZ: u32 = 100_000;

/// A named DC supply net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerRail {
    pub name: String,
    /// Nominal voltage in volts
    pub voltage: f64,
    pub tolerance_mv: u32,
}

impl PowerRail {
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            name: name.into(),
            voltage,
            tolerance_mv: DEFAULT_RAIL_TOLERANCE_MV,
        }
    }

    /// Tolerance converted to volts.
    pub fn tolerance_v(&self) -> f64 {
        self.tolerance_mv as f64 / 1000.0
    }

    /// Allowed measurement window `(lo, hi)` in volts.
    pub fn window(&self) -> (f64, f64) {
        let tol = self.tolerance_v();
        (self.voltage - tol, self.voltage + tol)
    }
}

/// A clock or crystal source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Oscillator {
    #[serde(rename = "ref")]
    pub reference: String,
    pub frequency_hz: f64,
    pub tolerance_hz: u32,
}

impl Oscillator {
    pub fn new(reference: impl Into<String>, frequency_hz: f64) -> Self {
        Self {
            reference: reference.into(),
            frequency_hz,
            tolerance_hz: DEFAULT_OSC_TOLERANCE_HZ,
        }
    }

    /// Allowed frequency window `(lo, hi)` in Hz.
    pub fn window_hz(&self) -> (f64, f64) {
        let tol = self.tolerance_hz as f64;
        (self.frequency_hz - tol, self.frequency_hz + tol)
    }
}

/// A firmware-level behavioral check (BIT command, self test, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionalTest {
    pub name: String,
    pub command: Option<String>,
    pub expected: Option<String>,
}

impl FunctionalTest {
    pub fn new(name: impl Into<String>, command: &str, expected: &str) -> Self {
        Self {
            name: name.into(),
            command: Some(command.to_string()),
            expected: Some(expected.to_string()),
        }
    }
}

/// Structured model of a board.
///
/// Deserializing goes through the schema check in `model::schema`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEntities {
    pub title: String,
    pub rails: Vec<PowerRail>,
    pub oscillators: Vec<Oscillator>,
    pub functional_tests: Vec<FunctionalTest>,
}

impl ParsedEntities {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rails: Vec::new(),
            oscillators: Vec::new(),
            functional_tests: Vec::new(),
        }
    }

    /// Pretty-printed JSON in the entity interchange shape.
    pub fn to_json_pretty(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Compact JSON, used as the LLM context search input.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Default for ParsedEntities {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}
