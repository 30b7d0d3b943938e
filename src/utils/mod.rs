//! Shared utilities.
//!
//! Currently this holds the seeded random number generator used for weight
//! initialization and dropout masks.

pub mod rng;

pub use rng::{SimpleRng, DEFAULT_SEED};
