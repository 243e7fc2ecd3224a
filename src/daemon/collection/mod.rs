//! Everything that feeds the tracker: events coming from the host, the idle evaluation and the
//! (simulated) device signals.

pub mod bridge;
pub mod idle;
pub mod signal;
