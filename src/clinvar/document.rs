//! Document construction from classified rows.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::classify::classify_row;
use super::columns::*;
use super::normalize::normalize_document;
use super::row::RawRow;
use super::types::{CanonicalId, MutationKind, VariantDocument};
use crate::error::VarloadError;

/// Split a `;`-delimited column into a JSON array of strings.
pub fn split_list(value: &str) -> Value {
    Value::Array(
        value
            .split(';')
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

/// Parse a `namespace:value` cross-reference column.
///
/// Delimiters are `,` and `;`. A namespace seen more than once collects its
/// values into an array in encounter order. Tokens without a `:` are skipped.
///
/// ```
/// use ferro_varload::clinvar::parse_other_ids;
/// use serde_json::json;
///
/// let ids = parse_other_ids("MedGen:C0000001;OMIM:123456,OMIM:654321");
/// assert_eq!(
///     serde_json::Value::Object(ids),
///     json!({"MedGen": "C0000001", "OMIM": ["123456", "654321"]})
/// );
/// ```
pub fn parse_other_ids(value: &str) -> Map<String, Value> {
    let mut ids = Map::new();
    for token in value.trim_matches(';').split([';', ',']) {
        let Some((namespace, id)) = token.split_once(':') else {
            if !token.is_empty() {
                debug!("Skipping identifier without namespace: {:?}", token);
            }
            continue;
        };
        let id = Value::String(id.to_string());
        match ids.get_mut(namespace) {
            Some(Value::Array(existing)) => existing.push(id),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, id]);
            }
            None => {
                ids.insert(namespace.to_string(), id);
            }
        }
    }
    ids
}

fn text(row: &RawRow, column: usize) -> Value {
    Value::String(row.field(column).to_string())
}

fn object<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Map every column of a row onto the nested document layout.
///
/// The result is not normalized; see [`normalize_document`].
pub fn build_document(row: &RawRow, id: CanonicalId) -> VariantDocument {
    let body = object([
        ("allele_id", text(row, ALLELE_ID)),
        (
            "genome",
            Value::Object(object([
                ("assembly", text(row, ASSEMBLY)),
                ("chr", text(row, CHROMOSOME)),
                ("start", text(row, START)),
                ("end", text(row, END)),
            ])),
        ),
        ("type", text(row, TYPE)),
        ("name", text(row, NAME)),
        (
            "gene",
            Value::Object(object([
                ("id", text(row, GENE_ID)),
                ("symbol", text(row, GENE_SYMBOL)),
            ])),
        ),
        (
            "clinical_significance",
            split_list(row.field(CLINICAL_SIGNIFICANCE)),
        ),
        ("rs_dbsnp", text(row, RS_DBSNP)),
        ("nsv_dbvar", text(row, NSV_DBVAR)),
        ("rcv_accession", split_list(row.field(RCV_ACCESSION))),
        ("tested_in_gtr", text(row, TESTED_IN_GTR)),
        (
            "phenotype_id",
            Value::Object(parse_other_ids(row.field(PHENOTYPE_ID))),
        ),
        ("origin", text(row, ORIGIN)),
        ("cytogenic", text(row, CYTOGENIC)),
        ("review_status", text(row, REVIEW_STATUS)),
        (
            "hgvs",
            Value::Object(object([
                ("coding", text(row, HGVS_CODING)),
                ("protein", text(row, HGVS_PROTEIN)),
            ])),
        ),
        ("number_submitters", text(row, NUMBER_SUBMITTERS)),
        ("last_evaluated", text(row, LAST_EVALUATED)),
        ("guidelines", text(row, GUIDELINES)),
        ("other_ids", Value::Object(parse_other_ids(row.field(OTHER_IDS)))),
        ("variant_id", text(row, VARIANT_ID)),
    ]);
    VariantDocument { id, body }
}

/// Counters kept by [`DocumentStream`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Rows whose notation matched no rule or whose rule failed.
    pub unclassifiable: usize,
    /// Classified rows per mutation kind.
    pub by_kind: HashMap<MutationKind, usize>,
}

/// Turns eligible rows into normalized, unmerged documents.
///
/// Unclassifiable rows are logged and dropped. Errors from the row source
/// pass through unchanged.
pub struct DocumentStream<I> {
    rows: I,
    stats: DocumentStats,
}

impl<I> DocumentStream<I>
where
    I: Iterator<Item = Result<RawRow, VarloadError>>,
{
    pub fn new(rows: I) -> Self {
        Self {
            rows,
            stats: DocumentStats::default(),
        }
    }

    pub fn stats(&self) -> &DocumentStats {
        &self.stats
    }

    /// The wrapped row iterator.
    pub fn get_ref(&self) -> &I {
        &self.rows
    }
}

impl<I> Iterator for DocumentStream<I>
where
    I: Iterator<Item = Result<RawRow, VarloadError>>,
{
    type Item = Result<VariantDocument, VarloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            match classify_row(&row) {
                Ok(variant) => {
                    *self.stats.by_kind.entry(variant.kind).or_insert(0) += 1;
                    let mut doc = build_document(&row, variant.canonical_id());
                    normalize_document(&mut doc);
                    return Some(Ok(doc));
                }
                Err(e) => {
                    self.stats.unclassifiable += 1;
                    warn!(
                        "Line {}: unclassifiable {} notation {:?}: {}",
                        row.line(),
                        row.variant_type(),
                        row.coding_notation(),
                        e
                    );
                }
            }
        }
    }
}
