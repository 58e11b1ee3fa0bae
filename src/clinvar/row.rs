//! Raw variant summary rows and the eligibility filter.

use super::{columns, VALID_COLUMN_NO};
use crate::error::VarloadError;

/// One data line split into exactly [`VALID_COLUMN_NO`] fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: usize,
    fields: Vec<String>,
}

/// Why a row was (or was not) kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Coding notation is the `-` placeholder
    UnknownNotation,
    /// Coding notation contains `?`
    UncertainNotation,
    /// Chromosome column is empty
    MissingChromosome,
    /// Coding notation describes a protein change
    ProteinLevel,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl RawRow {
    /// Build a row from owned fields, enforcing the column count.
    pub fn new(line: usize, fields: Vec<String>) -> Result<Self, VarloadError> {
        if fields.len() != VALID_COLUMN_NO {
            return Err(VarloadError::MalformedRow {
                line,
                found: fields.len(),
            });
        }
        Ok(Self { line, fields })
    }

    /// Split a tab-delimited line.
    pub fn from_line(line: usize, text: &str) -> Result<Self, VarloadError> {
        Self::new(line, text.split('\t').map(str::to_string).collect())
    }

    /// 1-based line number in the input.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn field(&self, column: usize) -> &str {
        &self.fields[column]
    }

    pub fn variant_type(&self) -> &str {
        self.field(columns::TYPE)
    }

    pub fn chromosome(&self) -> &str {
        self.field(columns::CHROMOSOME)
    }

    pub fn start(&self) -> &str {
        self.field(columns::START)
    }

    pub fn end(&self) -> &str {
        self.field(columns::END)
    }

    pub fn coding_notation(&self) -> &str {
        self.field(columns::HGVS_CODING)
    }

    /// Check whether the row carries usable genomic-level notation.
    pub fn eligibility(&self) -> Eligibility {
        let coding = self.coding_notation();
        if coding == "-" {
            Eligibility::UnknownNotation
        } else if coding.contains('?') {
            Eligibility::UncertainNotation
        } else if self.chromosome().is_empty() {
            Eligibility::MissingChromosome
        } else if coding.contains("p.") {
            Eligibility::ProteinLevel
        } else {
            Eligibility::Eligible
        }
    }
}
