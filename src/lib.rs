// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-varload: ClinVar variant summary to search document converter
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! # Example
//!
//! ```
//! use ferro_varload::{classify_notation, parse_other_ids};
//!
//! // Derive the canonical genomic ID for a coding notation
//! let variant = classify_notation("NM_000000.1:c.10_20del", "deletion", "2", "500", "510").unwrap();
//! assert_eq!(variant.canonical_id().as_str(), "chr2:g.500_510del");
//!
//! // Parse a cross-reference column
//! let ids = parse_other_ids("MedGen:C0000001;OMIM:123456,OMIM:654321");
//! assert_eq!(ids["OMIM"], serde_json::json!(["123456", "654321"]));
//! ```

pub mod cli;
pub mod clinvar;
pub mod config;
pub mod error;
pub mod load;

// Re-export commonly used types
pub use clinvar::{
    classify_notation, classify_row, open_tsv, parse_other_ids, CanonicalId, ClassifiedVariant,
    MutationKind, OrderCheck, RawRow, RowSource, VariantDocument,
};
pub use config::{GroupingMode, OutputFormat, PipelineConfig, VarloadConfig};
pub use error::VarloadError;
pub use load::{load, DocumentSink, LoadReport, LoadStats, VariantPipeline, WriteFailure};

/// Result type alias for ferro-varload operations
pub type Result<T> = std::result::Result<T, VarloadError>;
