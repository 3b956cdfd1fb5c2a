pub mod entities;
pub mod plan;
pub mod schema;

pub use entities::*;
pub use plan::{Section, TestPlan, TestStep};
pub use schema::SchemaError;
