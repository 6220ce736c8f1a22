//! The tools module provides the helpers around the code tree.
//!
//! The tools are:
//! - cli: Command line interface and run options for the compress and decompress programs.
//! - freq_count: Frequency count of the 256 byte values in the input.
//! - report: Code-length statistics and size summaries for the log.
//!
pub mod cli;
pub mod freq_count;
pub mod report;
