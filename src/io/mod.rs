//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - submission/diagnostics exports (`export`)
//! - run-manifest JSON (`manifest`)

pub mod export;
pub mod ingest;
pub mod manifest;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
