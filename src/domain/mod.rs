//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`DailyPoint`, `TrajectoryPair`)
//! - derived records (`LongRecord`, `WeeklyRecord`, `QuantileRecord`)
//! - run configuration and geometry (`AggregateConfig`, `RunSpec`)

pub mod types;

pub use types::*;
