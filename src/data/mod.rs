//! Synthetic data generation for demo runs and test fixtures.

pub mod sample;

pub use sample::*;
