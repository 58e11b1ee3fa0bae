//! CLI utilities for ferro-varload
//!
//! Formatting helpers used by the binary, kept in the library so they can be
//! unit tested without spawning the process.

pub mod format;

pub use format::{
    output_classification, output_error, write_summary, ClassifyFormat,
};
