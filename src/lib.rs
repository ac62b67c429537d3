//! `hubcast` library crate.
//!
//! The binary (`hubcast`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the aggregation pipeline is reusable (e.g., future service wrappers,
//!   notebook bindings, batch schedulers)
//! - code stays easy to navigate as the project grows

pub mod agg;
pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod epiweek;
pub mod error;
pub mod io;
pub mod report;
