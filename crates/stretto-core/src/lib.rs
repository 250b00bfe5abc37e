//! Online, time-optimal, jerk-limited multi-axis trajectory generation.
//!
//! Given each axis' current and target kinematic state and its limits, the
//! generator produces on every control cycle the next state along a
//! seven-segment trajectory that respects all limits, reaches every target
//! at the same time, and minimizes that common arrival time.
//!
//! This crate intentionally avoids any transport- or application-specific
//! dependencies; the control loop that feeds it is an external concern.

pub mod block;
pub mod brake;
pub mod error;
pub mod generator;
pub mod params;
pub mod profile;
pub mod roots;
pub mod step1;
pub mod step2;
pub mod sync;
