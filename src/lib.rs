//! Digital wellbeing tracker. A small service follows user activity reported by a host (focus
//! sessions, screen time, unlocks and notifications), scores the day against configurable goals
//! and raises alerts when limits are crossed. The CLI reads and manages the persisted data.

pub mod cli;
pub mod daemon;
pub mod utils;
