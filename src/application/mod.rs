//! Application layer - cycle orchestration.

mod engine;

pub use engine::{CyclePhase, CycleResult, CycleStatus, InboundMessage, SessionEngine};
