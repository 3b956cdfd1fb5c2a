pub mod generator;
pub mod markdown;

pub use generator::{generate_plan_offline, Coverage, OFFLINE_DISCLAIMER, PLAN_TITLE_PREFIX};
pub use markdown::{render_document, render_markdown};
