//! The composed row-to-document pipeline.

use std::collections::HashMap;
use std::io::BufRead;

use tracing::info;

use crate::clinvar::{
    DocumentStream, MergeAdjacent, MergeByKey, MutationKind, RowSource, VariantDocument,
};
use crate::config::{GroupingMode, PipelineConfig};
use crate::error::VarloadError;

type Documents<R> = DocumentStream<RowSource<R>>;

enum Grouped<R: BufRead> {
    Adjacent(MergeAdjacent<Documents<R>>),
    ByKey(MergeByKey<Documents<R>>),
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows read from the input.
    pub rows_read: usize,
    /// Rows dropped by the eligibility filter.
    pub ineligible: usize,
    /// Eligible rows the classifier could not identify.
    pub unclassifiable: usize,
    /// Merged documents emitted.
    pub documents: usize,
    /// Rows folded into an earlier document with the same ID.
    pub merged_rows: usize,
    /// Classified rows per mutation kind.
    pub by_kind: HashMap<MutationKind, usize>,
}

impl LoadStats {
    /// Log the counters at info level.
    pub fn log_summary(&self) {
        info!(
            rows_read = self.rows_read,
            ineligible = self.ineligible,
            unclassifiable = self.unclassifiable,
            documents = self.documents,
            merged_rows = self.merged_rows,
            "Conversion finished"
        );
    }
}

/// Lazy sequence of merged, normalized documents read from a sorted TSV.
///
/// Yields `Err` at most once, for a fatal input error, and then ends.
pub struct VariantPipeline<R: BufRead> {
    inner: Grouped<R>,
    documents: usize,
}

impl<R: BufRead> VariantPipeline<R> {
    /// Build a pipeline over a TSV reader.
    pub fn new(reader: R, config: &PipelineConfig) -> Self {
        Self::from_source(RowSource::new(reader), config)
    }

    /// Build a pipeline over an already opened row source.
    pub fn from_source(source: RowSource<R>, config: &PipelineConfig) -> Self {
        let docs = DocumentStream::new(source);
        let inner = match config.grouping {
            GroupingMode::Adjacent => {
                Grouped::Adjacent(MergeAdjacent::new(docs, config.order_check))
            }
            GroupingMode::Materialized => Grouped::ByKey(MergeByKey::new(docs)),
        };
        Self {
            inner,
            documents: 0,
        }
    }

    /// Counters so far; final once the iterator is exhausted.
    pub fn stats(&self) -> LoadStats {
        let (docs, merged_rows) = match &self.inner {
            Grouped::Adjacent(merger) => (merger.get_ref(), merger.merged_rows()),
            Grouped::ByKey(merger) => (merger.get_ref(), merger.merged_rows()),
        };
        let source = docs.get_ref().stats();
        LoadStats {
            rows_read: source.rows_read,
            ineligible: source.ineligible,
            unclassifiable: docs.stats().unclassifiable,
            documents: self.documents,
            merged_rows,
            by_kind: docs.stats().by_kind.clone(),
        }
    }
}

impl<R: BufRead> Iterator for VariantPipeline<R> {
    type Item = Result<VariantDocument, VarloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = match &mut self.inner {
            Grouped::Adjacent(merger) => merger.next(),
            Grouped::ByKey(merger) => merger.next(),
        };
        if let Some(Ok(_)) = next {
            self.documents += 1;
        }
        next
    }
}
