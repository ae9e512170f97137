//! Benchmark harness for the quarry storage engines.
//!
//! The CLI lives in the library so integration tests can drive it without spawning a process.

pub mod cli;
