//! ClinVar variant summary conversion.
//!
//! This module turns rows of the tab-delimited ClinVar variant summary export
//! into search documents keyed by a genomic canonical ID. The stages are:
//!
//! 1. [`RowSource`] reads the pre-sorted TSV and drops ineligible rows.
//! 2. [`classify_row`] derives a [`CanonicalId`] from the coding notation.
//! 3. [`build_document`] maps the 25 columns onto the nested document.
//! 4. [`normalize_document`] coerces numbers, unwraps singletons and removes
//!    `"-"` placeholders.
//! 5. [`MergeAdjacent`] folds consecutive documents sharing an ID.
//!
//! Every stage is a lazy iterator adapter; nothing is materialized unless
//! [`GroupingMode::Materialized`](crate::config::GroupingMode) is selected.
//!
//! # Example
//!
//! ```
//! use ferro_varload::clinvar::{classify_notation, MutationKind};
//!
//! let variant = classify_notation("NM_000000.1:c.123A>G", "single nucleotide variant", "1", "1000", "1000")
//!     .unwrap();
//! assert_eq!(variant.kind, MutationKind::Substitution);
//! assert_eq!(variant.canonical_id().as_str(), "chr1:g.1000A>G");
//! ```
//!
//! # References
//!
//! - [ClinVar FTP: variant_summary.txt](https://ftp.ncbi.nlm.nih.gov/pub/clinvar/tab_delimited/)
//! - [HGVS nomenclature](https://hgvs-nomenclature.org/)

mod classify;
mod document;
mod merge;
mod normalize;
mod row;
mod source;
mod types;

pub use classify::{
    classify_notation, classify_row, ClassificationRule, ClassifiedVariant, ClassifyError,
    NotationContext, RULES,
};
pub use document::{build_document, parse_other_ids, split_list, DocumentStats, DocumentStream};
pub use merge::{merge_documents, merge_into, MergeAdjacent, MergeByKey, OrderCheck};
pub use normalize::{
    coerce_numbers, normalize_document, normalize_value, sweep_sentinels, unwrap_singletons,
    SENTINEL,
};
pub use row::{Eligibility, RawRow};
pub use source::{open_tsv, RowSource, SourceStats};
pub use types::{CanonicalId, MutationKind, VariantDocument, SOURCE_KEY};

/// Number of tab-delimited columns in every data row.
pub const VALID_COLUMN_NO: usize = 25;

/// Positions of the variant summary columns.
pub mod columns {
    pub const ALLELE_ID: usize = 0;
    pub const TYPE: usize = 1;
    pub const NAME: usize = 2;
    pub const GENE_ID: usize = 3;
    pub const GENE_SYMBOL: usize = 4;
    pub const CLINICAL_SIGNIFICANCE: usize = 5;
    pub const RS_DBSNP: usize = 6;
    pub const NSV_DBVAR: usize = 7;
    pub const RCV_ACCESSION: usize = 8;
    pub const TESTED_IN_GTR: usize = 9;
    pub const PHENOTYPE_ID: usize = 10;
    pub const ORIGIN: usize = 11;
    pub const ASSEMBLY: usize = 12;
    pub const CHROMOSOME: usize = 13;
    pub const START: usize = 14;
    pub const END: usize = 15;
    pub const CYTOGENIC: usize = 16;
    pub const REVIEW_STATUS: usize = 17;
    pub const HGVS_CODING: usize = 18;
    pub const HGVS_PROTEIN: usize = 19;
    pub const NUMBER_SUBMITTERS: usize = 20;
    pub const LAST_EVALUATED: usize = 21;
    pub const GUIDELINES: usize = 22;
    pub const OTHER_IDS: usize = 23;
    pub const VARIANT_ID: usize = 24;
}
