//! Bringup - hardware bring-up and test plan generation
//!
//! Turns board design artifacts (entity JSON, IPC-D-356A netlists, BOMs,
//! PDFs, Altium dumps, ZIP bundles) into an ordered, Markdown-rendered
//! bring-up procedure with pass/fail criteria.
//!
//! # Quick Start
//!
//! ```no_run
//! use bringup::{BringupCore, LoadMode, LlmConfig, PlanOptions};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), bringup::BringupError> {
//! let entities = BringupCore::load_entities(Path::new("board.ipc"), LoadMode::Auto)?;
//! let plan = BringupCore::build_plan(
//!     &entities,
//!     PlanOptions { offline: true },
//!     &LlmConfig::default(),
//!     None,
//! )
//! .await;
//! println!("{}", plan.to_markdown());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Offline plans**: deterministic, template-based, no network
//! - **Netlist parsing**: rails, crystals, test points and connectors
//! - **Heuristic inference**: entities from free text (BOM, PDF, Altium)
//! - **Optional LLM**: OpenAI-compatible enhancement of the plan notes,
//!   with an optional context library

pub mod ai;
pub mod context;
pub mod core;
pub mod infer;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod plan;
pub mod rules;

// Re-export main types
pub use crate::core::{BringupCore, BringupError, LoadMode, PlanOptions};
pub use ai::{enhance_plan, generate_plan_llm, AIProvider, LlmConfig, OpenAIClient};
pub use context::{ContextStore, MemoryStore, SqliteStore};
pub use infer::HeuristicInferencer;
pub use ingest::InputKind;
pub use model::{
    FunctionalTest, Oscillator, ParsedEntities, PowerRail, SchemaError, Section, TestPlan,
    TestStep,
};
pub use parser::NetlistParser;
pub use plan::{generate_plan_offline, render_document, render_markdown};
pub use rules::{annotate_plan, validate_entities};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BringupCore, BringupError, LoadMode, ParsedEntities, PlanOptions, Section, TestPlan,
        TestStep,
    };
}
