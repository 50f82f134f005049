//! AI systems (monster controller)

pub mod fsm;
pub mod lifecycle;
pub mod motion;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod fsm_tests;

// Re-export all systems
pub use fsm::*;
pub use lifecycle::*;
pub use motion::*;
