pub mod netlist;

// Re-export for convenience
pub use netlist::{NetlistError, NetlistParser, TestPointRecord, UNKNOWN_BOARD};
