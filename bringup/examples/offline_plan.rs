//! Offline plan example: load any supported input and print the Markdown plan.

use bringup::prelude::*;
use bringup::{render_document, LlmConfig};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), BringupError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/sensor_node.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example offline_plan [path/to/design]");
        std::process::exit(1);
    }

    let entities = BringupCore::load_entities(path, LoadMode::Auto)?;
    println!(
        "Loaded '{}': {} rails, {} oscillators, {} tests",
        entities.title,
        entities.rails.len(),
        entities.oscillators.len(),
        entities.functional_tests.len()
    );
    println!();

    let plan = BringupCore::build_plan(
        &entities,
        PlanOptions { offline: true },
        &LlmConfig::default(),
        None,
    )
    .await;

    println!("{}", render_document(&plan));
    Ok(())
}
