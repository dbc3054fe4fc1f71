// THEORY:
// This file is the main entry point for the `motion_sense` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `motion_sense_server`
// transport shell).
//
// The primary goal is to export the `DetectionSession` and its associated data
// structures (`MotionConfig`, `MotionResult`, etc.) as the clean, high-level
// interface for the motion engine. The individual stages (`core_modules`) stay
// public so they can be driven and tested one at a time, but a consumer only ever
// needs a session: one frame in, one result out.

pub mod config;
pub mod core_modules;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{ConfigError, MotionConfig};
pub use core_modules::decoder::DecodeError;
pub use core_modules::motion_detector::{MotionLevel, MotionSummary};
pub use core_modules::region::{Centroid, Region};
pub use pipeline::{DetectionSession, MotionResult};
