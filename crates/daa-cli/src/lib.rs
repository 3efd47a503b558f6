//! DAA CLI - command line front end for encounter metrics.
//!
//! Provides the `daa_metrics` binary, which reads a trajectory log and its
//! threshold configuration and prints per-intruder conflict metrics.

pub mod config;
pub mod report;

pub use config::{load_detector, ConfigError, ParameterTable};
pub use report::{Report, TextReport};
