//! Structured logging for Plexus binaries.
//!
//! Console output (plain or JSON) with `RUST_LOG`-style filtering, plus an
//! optional daily-rolling NDJSON file.

pub mod logger;

pub use logger::{build_filter, init_logger, LogOptions};
