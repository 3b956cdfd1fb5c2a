//! End-to-end pipeline tests: load, plan, annotate, render.

use bringup::prelude::*;
use bringup::{generate_plan_offline, render_document, validate_entities, LlmConfig, PowerRail};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

async fn offline_plan(entities: &ParsedEntities) -> TestPlan {
    BringupCore::build_plan(entities, PlanOptions { offline: true }, &LlmConfig::default(), None).await
}

#[tokio::test]
async fn test_json_to_markdown() {
    let entities = BringupCore::load_entities(&fixture("sensor_node.json"), LoadMode::Entities)
        .expect("fixture loads");
    let md = render_document(&offline_plan(&entities).await);

    assert!(md.starts_with("# Bring-Up & Test Plan — LoRa Sensor Node Rev B\n"));
    for section in Section::ALL {
        assert!(md.contains(&format!("## {}", section)), "missing section {}", section);
    }
    assert!(md.contains("**V1. Measure rail +5V**"));
    assert!(md.contains("- Expected: 5.00 V (allowed: 4.75–5.25 V)"));
    assert!(md.contains("- Expected: ~32.000 MHz (allowed: 31.980–32.020 MHz)"));
    assert!(md.contains("**T2. I2C BIT: Run `bit.i2c`**"));
    assert!(md.contains("**N3. I2C bus scan"));
    assert!(md.contains("---\n### Notes\n"));
    assert!(!md.contains("Validation Notes:"));
}

#[tokio::test]
async fn test_smoke_board_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("smoke.json");
    std::fs::write(
        &input,
        r#"{"title":"SmokeTest","rails":[{"name":"+5V","voltage":5.0,"tolerance_mv":100}],"oscillators":[{"ref":"Y1","frequency_hz":16000000,"tolerance_hz":100000}],"functional_tests":[{"name":"Ping","command":"bit.ping","expected":"PASS"}]}"#,
    )
    .unwrap();

    let entities = BringupCore::load_entities(&input, LoadMode::Entities).unwrap();
    let plan = offline_plan(&entities).await;
    assert_eq!(plan.title, "Bring-Up & Test Plan — SmokeTest");

    let md = render_document(&plan);
    assert!(md.starts_with("# Bring-Up & Test Plan — SmokeTest\n"));
    for header in [
        "Setup",
        "Visual Inspection",
        "Voltage Rail Checks",
        "Oscillator Checks",
        "Firmware Programming",
        "Functional Tests",
        "Edge Cases & Fail-safes",
        "Close-out",
    ] {
        assert!(md.contains(&format!("\n## {}\n", header)), "missing header {}", header);
    }
}

#[tokio::test]
async fn test_sections_appear_in_order() {
    let entities = BringupCore::load_entities(&fixture("sensor_node.json"), LoadMode::Auto).unwrap();
    let plan = offline_plan(&entities).await;
    let sections: Vec<Section> = plan.steps.iter().map(|s| s.section).collect();
    let mut sorted = sections.clone();
    sorted.sort();
    assert_eq!(sections, sorted);
}

#[tokio::test]
async fn test_plan_is_deterministic() {
    let entities = BringupCore::load_entities(&fixture("uno_r3.ipc"), LoadMode::Netlist).unwrap();
    let first = render_document(&offline_plan(&entities).await);
    let second = render_document(&offline_plan(&entities).await);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_duplicate_rails_are_reported() {
    let mut entities = ParsedEntities::new("Dup");
    entities.rails.push(PowerRail::new("+5V", 5.0));
    entities.rails.push(PowerRail::new("+5v", 5.0));
    entities.rails.push(PowerRail::new("+5V", 5.0));

    let issues = validate_entities(&entities);
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.starts_with("Duplicate rail entry:")));

    let plan = offline_plan(&entities).await;
    let notes = plan.notes.as_deref().unwrap();
    assert!(notes.ends_with("Validation Notes:\n- Duplicate rail entry: +5v 5.0V\n- Duplicate rail entry: +5V 5.0V"));
    // Validation never touches steps.
    assert_eq!(plan.steps, generate_plan_offline(&entities).steps);
}

#[tokio::test]
async fn test_bom_auto_mode() {
    let entities = BringupCore::load_entities(&fixture("bom.csv"), LoadMode::Auto).unwrap();
    assert_eq!(entities.title, "bom.csv");

    let rails: Vec<(&str, f64)> = entities.rails.iter().map(|r| (r.name.as_str(), r.voltage)).collect();
    assert_eq!(rails, vec![("+5V", 5.0)]);
    assert_eq!(entities.oscillators.len(), 1);
    assert_eq!(entities.oscillators[0].frequency_hz, 16_000_000.0);

    let names: Vec<&str> = entities.functional_tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["LoRa BIT", "GPS BIT"]);

    let md = render_document(&offline_plan(&entities).await);
    assert!(md.contains("## Oscillator Checks"));
}

#[test]
fn test_entities_round_trip_through_json_file() {
    let entities = BringupCore::load_entities(&fixture("uno_r3.ipc"), LoadMode::Auto).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entities.json");
    std::fs::write(&path, entities.to_json_pretty()).unwrap();

    let reloaded = BringupCore::load_entities(&path, LoadMode::Entities).unwrap();
    assert_eq!(reloaded, entities);
}
