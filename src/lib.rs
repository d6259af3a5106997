//! Socket Forge Application Library
//!
//! Configuration, logging, execution modes and output sinks of the
//! `socket-forge` command line generator.

pub mod benchmark;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod setup;
pub mod visualization;

pub use config::AppConfig;
pub use error::AppError;
