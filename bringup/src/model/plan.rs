use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed plan sections, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Setup")]
    Setup,
    #[serde(rename = "Visual Inspection")]
    VisualInspection,
    #[serde(rename = "Voltage Rail Checks")]
    VoltageRailChecks,
    #[serde(rename = "Oscillator Checks")]
    OscillatorChecks,
    #[serde(rename = "Firmware Programming")]
    FirmwareProgramming,
    #[serde(rename = "Functional Tests")]
    FunctionalTests,
    #[serde(rename = "Edge Cases & Fail-safes")]
    EdgeCases,
    #[serde(rename = "Close-out")]
    CloseOut,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Setup,
        Section::VisualInspection,
        Section::VoltageRailChecks,
        Section::OscillatorChecks,
        Section::FirmwareProgramming,
        Section::FunctionalTests,
        Section::EdgeCases,
        Section::CloseOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Setup => "Setup",
            Section::VisualInspection => "Visual Inspection",
            Section::VoltageRailChecks => "Voltage Rail Checks",
            Section::OscillatorChecks => "Oscillator Checks",
            Section::FirmwareProgramming => "Firmware Programming",
            Section::FunctionalTests => "Functional Tests",
            Section::EdgeCases => "Edge Cases & Fail-safes",
            Section::CloseOut => "Close-out",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStep {
    /// Section-scoped id, e.g. `V1`, `O2`, `N1`
    pub id: String,
    pub section: Section,
    pub description: String,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
}

impl TestStep {
    pub fn new(id: impl Into<String>, section: Section, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            section,
            description: description.into(),
            equipment: None,
            expected: None,
        }
    }

    pub fn equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// An ordered bring-up procedure.
///
/// Created once by the generator; later stages only append to `notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub title: String,
    pub steps: Vec<TestStep>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TestPlan {
    /// Append a titled block to the notes, keeping whatever is already there.
    pub fn append_notes(mut self, header: &str, body: &str) -> Self {
        let mut notes = self.notes.take().unwrap_or_default();
        notes.push_str("\n\n");
        notes.push_str(header);
        notes.push('\n');
        notes.push_str(body);
        self.notes = Some(notes);
        self
    }

    pub fn steps_in(&self, section: Section) -> impl Iterator<Item = &TestStep> {
        self.steps.iter().filter(move |s| s.section == section)
    }
}
