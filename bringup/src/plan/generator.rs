//! Offline Plan Generator
//!
//! Expands an entity set into a fixed-order bring-up procedure. This is the
//! reference output of the system: no I/O, no network, same input gives the
//! same plan.

use crate::model::{ParsedEntities, Section, TestPlan, TestStep};

pub const PLAN_TITLE_PREFIX: &str = "Bring-Up & Test Plan — ";
pub const OFFLINE_DISCLAIMER: &str = "Generated offline via deterministic template. Review tolerances and test point references before lab use.";
pub const FUNCTIONAL_FALLBACK_EXPECTED: &str = "Return PASS or expected telemetry";

fn setup_steps() -> Vec<TestStep> {
    vec![
        TestStep::new("S0", Section::Setup, "Quick continuity check: GND vs +5V/+3V3 not shorted")
            .equipment("DMM (diode/continuity)")
            .expected("Rails not shorted to GND"),
        TestStep::new(
            "S1",
            Section::Setup,
            "ESD precautions; connect board to bench PSU and GND mat.",
        )
        .equipment("ESD strap, bench PSU"),
        TestStep::new(
            "S2",
            Section::Setup,
            "Connect DMM probes to common GND and designated test points.",
        )
        .equipment("DMM, probes"),
        TestStep::new(
            "S3",
            Section::Setup,
            "Set bench PSU to 5.0V and current limit to 200 mA; leave output disabled.",
        )
        .equipment("Bench PSU")
        .expected("PSU configured 5.0V, 0.2A limit"),
        TestStep::new(
            "S4",
            Section::Setup,
            "Enable PSU; verify current draw ≤ 0.2A, else power off and stop.",
        )
        .equipment("Bench PSU, DMM")
        .expected("Board stays below current limit"),
    ]
}

fn visual_inspection_step() -> TestStep {
    TestStep::new(
        "V0",
        Section::VisualInspection,
        "Check component orientation, solder bridges, missing parts.",
    )
    .equipment("Loupe")
    .expected("IPC-610 Class 2 acceptable")
}

fn voltage_steps(entities: &ParsedEntities) -> Vec<TestStep> {
    entities
        .rails
        .iter()
        .enumerate()
        .map(|(i, rail)| {
            let (lo, hi) = rail.window();
            TestStep::new(
                format!("V{}", i + 1),
                Section::VoltageRailChecks,
                format!("Measure rail {}", rail.name),
            )
            .equipment("DMM")
            .expected(format!(
                "{:.2} V (allowed: {:.2}–{:.2} V)",
                rail.voltage, lo, hi
            ))
        })
        .collect()
}

fn oscillator_steps(entities: &ParsedEntities) -> Vec<TestStep> {
    entities
        .oscillators
        .iter()
        .enumerate()
        .map(|(i, osc)| {
            let (lo, hi) = osc.window_hz();
            TestStep::new(
                format!("O{}", i + 1),
                Section::OscillatorChecks,
                format!("Probe oscillator {}", osc.reference),
            )
            .equipment("Oscilloscope")
            .expected(format!(
                "~{:.3} MHz (allowed: {:.3}–{:.3} MHz)",
                osc.frequency_hz / 1e6,
                lo / 1e6,
                hi / 1e6
            ))
        })
        .collect()
}

fn firmware_step() -> TestStep {
    TestStep::new(
        "P1",
        Section::FirmwareProgramming,
        "Flash firmware and open serial console @115200 baud.",
    )
    .equipment("Programmer, USB cable")
    .expected("Device boots without faults; serial console opens at 115200 baud")
}

fn functional_steps(entities: &ParsedEntities) -> Vec<TestStep> {
    entities
        .functional_tests
        .iter()
        .enumerate()
        .map(|(i, test)| {
            let action = match test.command.as_deref() {
                Some(cmd) if !cmd.is_empty() => format!("Run `{}`", cmd),
                _ => format!("Execute {}", test.name),
            };
            let expected = match test.expected.as_deref() {
                Some(e) if !e.is_empty() => e,
                _ => FUNCTIONAL_FALLBACK_EXPECTED,
            };
            TestStep::new(
                format!("T{}", i + 1),
                Section::FunctionalTests,
                format!("{}: {}", test.name, action),
            )
            .equipment("PC serial console")
            .expected(expected)
        })
        .collect()
}

fn mentions_i2c(entities: &ParsedEntities) -> bool {
    entities.functional_tests.iter().any(|t| {
        t.name.to_uppercase().contains("I2C")
            || t.command
                .as_deref()
                .is_some_and(|c| c.to_uppercase().contains("I2C"))
    })
}

fn edge_case_steps(entities: &ParsedEntities) -> Vec<TestStep> {
    let mut steps = vec![
        TestStep::new(
            "N1",
            Section::EdgeCases,
            "Verify over-current protection: gradually increase load until PSU current limit triggers",
        )
        .equipment("Variable load, DMM")
        .expected("PSU shuts down at 200mA limit"),
        TestStep::new(
            "N2",
            Section::EdgeCases,
            "Brown-out test: reduce input voltage to 4.0V and verify graceful shutdown",
        )
        .equipment("Variable PSU, DMM")
        .expected("System shuts down cleanly without damage"),
    ];

    if mentions_i2c(entities) {
        steps.push(
            TestStep::new(
                "N3",
                Section::EdgeCases,
                "I2C bus scan: probe all addresses 0x08-0x77 for unexpected devices",
            )
            .equipment("I2C analyzer or scope")
            .expected("Only expected devices respond"),
        );
    }

    steps
}

fn close_out_step() -> TestStep {
    TestStep::new("C1", Section::CloseOut, "Power-down and disconnect all equipment.")
        .equipment("None")
        .expected("Board safely powered off, all connections removed")
}

/// Entity counts against generated step counts, per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub rails_found: usize,
    pub rails_tested: usize,
    pub oscillators_found: usize,
    pub oscillators_tested: usize,
    pub tests_found: usize,
    pub test_steps: usize,
}

impl Coverage {
    pub fn compute(entities: &ParsedEntities, steps: &[TestStep]) -> Self {
        let count = |section: Section| steps.iter().filter(|s| s.section == section).count();
        Self {
            rails_found: entities.rails.len(),
            rails_tested: count(Section::VoltageRailChecks),
            oscillators_found: entities.oscillators.len(),
            oscillators_tested: count(Section::OscillatorChecks),
            tests_found: entities.functional_tests.len(),
            test_steps: count(Section::FunctionalTests),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Coverage Summary:\n- rails: {} found / {} tested\n- oscillators: {} found / {} tested\n- functional_tests: {} tests / {} steps",
            self.rails_found,
            self.rails_tested,
            self.oscillators_found,
            self.oscillators_tested,
            self.tests_found,
            self.test_steps
        )
    }
}

/// Build the deterministic plan for an entity set.
pub fn generate_plan_offline(entities: &ParsedEntities) -> TestPlan {
    let mut steps = setup_steps();
    steps.push(visual_inspection_step());
    steps.extend(voltage_steps(entities));
    steps.extend(oscillator_steps(entities));
    steps.push(firmware_step());
    steps.extend(functional_steps(entities));
    steps.extend(edge_case_steps(entities));
    steps.push(close_out_step());

    let coverage = Coverage::compute(entities, &steps);
    let notes = format!("{}\n\n{}", OFFLINE_DISCLAIMER, coverage.render());

    tracing::debug!("Generated {} steps for '{}'", steps.len(), entities.title);

    TestPlan {
        title: format!("{}{}", PLAN_TITLE_PREFIX, entities.title),
        steps,
        notes: Some(notes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionalTest, Oscillator, PowerRail};

    fn smoke() -> ParsedEntities {
        let mut ent = ParsedEntities::new("SmokeTest");
        ent.rails.push(PowerRail::new("+5V", 5.0));
        ent.oscillators.push(Oscillator::new("Y1", 16_000_000.0));
        ent.functional_tests
            .push(FunctionalTest::new("Ping", "bit.ping", "PASS"));
        ent
    }

    fn ids(plan: &TestPlan, section: Section) -> Vec<String> {
        plan.steps_in(section).map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_title() {
        let plan = generate_plan_offline(&smoke());
        assert_eq!(plan.title, "Bring-Up & Test Plan — SmokeTest");
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let plan = generate_plan_offline(&smoke());
        let mut order: Vec<Section> = Vec::new();
        for step in &plan.steps {
            if order.last() != Some(&step.section) {
                order.push(step.section);
            }
        }
        assert_eq!(order, Section::ALL.to_vec());
    }

    #[test]
    fn test_fixed_section_sizes() {
        let plan = generate_plan_offline(&ParsedEntities::new("Empty"));
        assert_eq!(plan.steps_in(Section::Setup).count(), 5);
        assert_eq!(plan.steps_in(Section::VisualInspection).count(), 1);
        assert_eq!(plan.steps_in(Section::FirmwareProgramming).count(), 1);
        assert_eq!(plan.steps_in(Section::CloseOut).count(), 1);
        assert_eq!(ids(&plan, Section::EdgeCases), vec!["N1", "N2"]);
        assert_eq!(plan.steps_in(Section::VoltageRailChecks).count(), 0);
    }

    #[test]
    fn test_one_voltage_step_per_rail() {
        let mut ent = smoke();
        ent.rails.push(PowerRail::new("+3V3", 3.3));
        ent.rails.push(PowerRail {
            name: "VBAT".to_string(),
            voltage: 3.7,
            tolerance_mv: 250,
        });
        let plan = generate_plan_offline(&ent);
        assert_eq!(ids(&plan, Section::VoltageRailChecks), vec!["V1", "V2", "V3"]);

        let expected: Vec<_> = plan
            .steps_in(Section::VoltageRailChecks)
            .map(|s| s.expected.clone().unwrap())
            .collect();
        assert_eq!(expected[0], "5.00 V (allowed: 4.90–5.10 V)");
        assert_eq!(expected[1], "3.30 V (allowed: 3.20–3.40 V)");
        assert_eq!(expected[2], "3.70 V (allowed: 3.45–3.95 V)");
    }

    #[test]
    fn test_oscillator_window_text() {
        let plan = generate_plan_offline(&smoke());
        let step = plan.steps_in(Section::OscillatorChecks).next().unwrap();
        assert_eq!(step.id, "O1");
        assert_eq!(step.description, "Probe oscillator Y1");
        assert_eq!(
            step.expected.as_deref(),
            Some("~16.000 MHz (allowed: 15.900–16.100 MHz)")
        );
    }

    #[test]
    fn test_functional_step_text() {
        let mut ent = smoke();
        ent.functional_tests.push(FunctionalTest {
            name: "Blink".to_string(),
            command: None,
            expected: None,
        });
        let plan = generate_plan_offline(&ent);
        let steps: Vec<&TestStep> = plan.steps_in(Section::FunctionalTests).collect();
        assert_eq!(steps[0].description, "Ping: Run `bit.ping`");
        assert_eq!(steps[0].expected.as_deref(), Some("PASS"));
        assert_eq!(steps[1].id, "T2");
        assert_eq!(steps[1].description, "Blink: Execute Blink");
        assert_eq!(steps[1].expected.as_deref(), Some(FUNCTIONAL_FALLBACK_EXPECTED));
    }

    #[test]
    fn test_i2c_scan_only_when_mentioned() {
        let plan = generate_plan_offline(&smoke());
        assert!(!ids(&plan, Section::EdgeCases).contains(&"N3".to_string()));

        let mut ent = smoke();
        ent.functional_tests
            .push(FunctionalTest::new("Sensor bus", "bit.i2c", "PASS"));
        let plan = generate_plan_offline(&ent);
        assert_eq!(ids(&plan, Section::EdgeCases), vec!["N1", "N2", "N3"]);

        let mut ent = smoke();
        ent.functional_tests.push(FunctionalTest {
            name: "i2c probe".to_string(),
            command: None,
            expected: None,
        });
        let plan = generate_plan_offline(&ent);
        assert_eq!(plan.steps_in(Section::EdgeCases).count(), 3);
    }

    #[test]
    fn test_coverage_notes() {
        let plan = generate_plan_offline(&smoke());
        let notes = plan.notes.unwrap();
        assert!(notes.starts_with(OFFLINE_DISCLAIMER));
        assert!(notes.contains(
            "Coverage Summary:\n- rails: 1 found / 1 tested\n- oscillators: 1 found / 1 tested\n- functional_tests: 1 tests / 1 steps"
        ));
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_plan_offline(&smoke()), generate_plan_offline(&smoke()));
    }
}
