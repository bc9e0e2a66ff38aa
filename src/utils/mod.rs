//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Shell subprocess construction
//! - `io` - File I/O with consistent error handling, broadcast writers
//! - `telemetry` - Tracing subscriber setup

pub mod command;
pub mod io;
pub mod telemetry;
