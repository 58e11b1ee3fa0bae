//! Mutation classification from coding-sequence notation.
//!
//! The coding notation of a row (`NM_000000.1:c.123A>G`) is reduced to the
//! part after the first colon and tested against [`RULES`] in order. The first
//! rule whose predicate holds decides the mutation kind and builds the locus
//! suffix of the canonical ID. Several patterns can match the same notation
//! (a deletion often contains a base run that would also satisfy the
//! replacement rule), so the order of the table is the contract.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::row::RawRow;
use super::types::{CanonicalId, MutationKind};

static SUBSTITUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ATCGMNHYR]+>[ATCGMNHYR]+").unwrap());
static INSERTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"ins[ATCGMNHYR]+|ins[0-9]+").unwrap());
static INVERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"inv(?:[0-9]+|[ATCGMNHYR]+)?").unwrap());
static TRAILING_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ATCGMNHYR]+|[0-9]+").unwrap());
static REPLACEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ATCGMNYR=]+").unwrap());

/// Reasons a notation yields no canonical ID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Notation has no `accession:` prefix to strip
    #[error("notation has no ':' separator: {notation}")]
    MissingColon { notation: String },

    /// Variant type is `indel` but the notation has no insertion token
    #[error("indel without insertion token: {notation}")]
    IndelWithoutInsertion { notation: String },

    /// None of the rules applied
    #[error("no classification rule matched {variant_type} {notation}")]
    NoMatchingRule {
        variant_type: String,
        notation: String,
    },
}

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct NotationContext<'a> {
    /// Notation after the first colon, e.g. `c.123A>G`.
    pub notation: &'a str,
    /// Variant type column, e.g. `deletion`.
    pub variant_type: &'a str,
}

impl<'a> NotationContext<'a> {
    /// Strip the accession prefix from a full coding notation.
    pub fn new(coding: &'a str, variant_type: &'a str) -> Result<Self, ClassifyError> {
        let (_, notation) = coding
            .split_once(':')
            .ok_or_else(|| ClassifyError::MissingColon {
                notation: coding.to_string(),
            })?;
        Ok(Self {
            notation,
            variant_type,
        })
    }

    fn has_insertion(&self) -> bool {
        INSERTION.is_match(self.notation)
    }

    fn trailing_run(&self) -> Option<&'a str> {
        TRAILING_RUN
            .find_iter(self.notation)
            .last()
            .map(|m| m.as_str())
    }
}

/// One entry of the priority table: a predicate and the builder it guards.
///
/// `build` returns the locus suffix (`A>G`, `insAT`, `del`, ...). It is only
/// called when `matches` returned true.
pub struct ClassificationRule {
    pub kind: MutationKind,
    pub matches: fn(&NotationContext<'_>) -> bool,
    pub build: fn(&NotationContext<'_>) -> Result<String, ClassifyError>,
}

/// Classification rules in priority order.
pub static RULES: [ClassificationRule; 7] = [
    ClassificationRule {
        kind: MutationKind::Substitution,
        matches: |ctx| SUBSTITUTION.is_match(ctx.notation),
        build: |ctx| Ok(first_match(&SUBSTITUTION, ctx.notation)),
    },
    ClassificationRule {
        kind: MutationKind::Insertion,
        matches: |ctx| ctx.has_insertion(),
        build: |ctx| Ok(first_match(&INSERTION, ctx.notation)),
    },
    ClassificationRule {
        kind: MutationKind::Deletion,
        matches: |ctx| ctx.variant_type == "deletion" && !ctx.has_insertion(),
        build: |_| Ok("del".to_string()),
    },
    ClassificationRule {
        kind: MutationKind::Indel,
        matches: |ctx| ctx.variant_type == "indel" && !ctx.has_insertion(),
        build: |ctx| match INSERTION.find(ctx.notation) {
            Some(ins) => Ok(format!("del{}", ins.as_str())),
            None => Err(ClassifyError::IndelWithoutInsertion {
                notation: ctx.notation.to_string(),
            }),
        },
    },
    ClassificationRule {
        kind: MutationKind::Duplication,
        matches: |ctx| ctx.notation.contains("dup") && ctx.trailing_run().is_some(),
        build: |ctx| Ok(format!("dup{}", ctx.trailing_run().unwrap_or_default())),
    },
    ClassificationRule {
        kind: MutationKind::Inversion,
        matches: |ctx| INVERSION.is_match(ctx.notation),
        build: |ctx| Ok(first_match(&INVERSION, ctx.notation)),
    },
    ClassificationRule {
        kind: MutationKind::Replacement,
        matches: |ctx| REPLACEMENT.is_match(ctx.notation),
        build: |ctx| Ok(first_match(&REPLACEMENT, ctx.notation)),
    },
];

fn first_match(re: &Regex, text: &str) -> String {
    re.find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// A classified row: the mutation kind, its locus suffix and coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedVariant {
    pub kind: MutationKind,
    /// Locus suffix built from the matched notation fragment.
    pub fragment: String,
    pub chrom: String,
    pub start: String,
    pub end: String,
}

impl ClassifiedVariant {
    /// The canonical ID, `chr<chrom>:g.<locus>`.
    ///
    /// Substitutions are anchored at the start position only; every other
    /// kind spans `start_end`.
    pub fn canonical_id(&self) -> CanonicalId {
        match self.kind {
            MutationKind::Substitution => {
                CanonicalId::new(&self.chrom, format!("{}{}", self.start, self.fragment))
            }
            _ => CanonicalId::new(
                &self.chrom,
                format!("{}_{}{}", self.start, self.end, self.fragment),
            ),
        }
    }
}

/// Classify a coding notation with its positional context.
pub fn classify_notation(
    coding: &str,
    variant_type: &str,
    chrom: &str,
    start: &str,
    end: &str,
) -> Result<ClassifiedVariant, ClassifyError> {
    let ctx = NotationContext::new(coding, variant_type)?;
    let rule = RULES
        .iter()
        .find(|rule| (rule.matches)(&ctx))
        .ok_or_else(|| ClassifyError::NoMatchingRule {
            variant_type: variant_type.to_string(),
            notation: ctx.notation.to_string(),
        })?;
    Ok(ClassifiedVariant {
        kind: rule.kind,
        fragment: (rule.build)(&ctx)?,
        chrom: chrom.to_string(),
        start: start.to_string(),
        end: end.to_string(),
    })
}

/// Classify a raw row.
pub fn classify_row(row: &RawRow) -> Result<ClassifiedVariant, ClassifyError> {
    classify_notation(
        row.coding_notation(),
        row.variant_type(),
        row.chromosome(),
        row.start(),
        row.end(),
    )
}
