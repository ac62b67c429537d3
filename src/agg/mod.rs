//! Aggregation pipeline stages.
//!
//! Responsibilities:
//!
//! - flatten per-location trajectory matrices into long daily records
//! - collapse daily records into per-draw epi-week sums (with the
//!   completeness gate)
//! - summarize weekly sums into hub-format quantile records

pub mod flatten;
pub mod quantile;
pub mod weekly;

pub use flatten::*;
pub use quantile::*;
pub use weekly::*;
