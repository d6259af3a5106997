//! Wiring between configuration and the generation engine.

pub mod execution;
