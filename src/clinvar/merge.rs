//! Merging of documents that share a canonical ID.
//!
//! The first document of a group is the base. For each later document, every
//! field present in both whose values differ is promoted to an array on the
//! base and the candidate value is appended. Equal values are left alone;
//! conflicting values are appended every time they recur. Fields that only
//! the candidate has are dropped, so the base's field set is fixed by its
//! first occurrence.
//!
//! [`MergeAdjacent`] streams and requires every row of a variant to be
//! contiguous in the input, which holds when the input is sorted by
//! chromosome, start, end and submitter count. [`MergeByKey`] buffers the
//! whole input and does not depend on ordering.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::types::{CanonicalId, VariantDocument};
use crate::error::VarloadError;

/// Merge `candidate` into `base`.
pub fn merge_into(base: &mut VariantDocument, candidate: VariantDocument) {
    let mut candidate = candidate.body;
    for (key, current) in base.body.iter_mut() {
        let Some(value) = candidate.remove(key) else {
            continue;
        };
        if *current == value {
            continue;
        }
        match current {
            Value::Array(values) => values.push(value),
            other => {
                let first = other.take();
                *other = Value::Array(vec![first, value]);
            }
        }
    }
}

/// Merge a group of documents in order. Returns `None` for an empty group.
pub fn merge_documents<I>(docs: I) -> Option<VariantDocument>
where
    I: IntoIterator<Item = VariantDocument>,
{
    let mut docs = docs.into_iter();
    let mut base = docs.next()?;
    for doc in docs {
        merge_into(&mut base, doc);
    }
    Some(base)
}

/// What to do when the input breaks the chromosome and start sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderCheck {
    /// Don't track sort order
    Off,
    /// Log and keep going; late rows of a variant become a separate document
    #[default]
    Warn,
    /// Abort with [`VarloadError::OutOfOrder`]
    Strict,
}

impl FromStr for OrderCheck {
    type Err = VarloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "warn" => Ok(Self::Warn),
            "strict" => Ok(Self::Strict),
            other => Err(VarloadError::config(format!(
                "unknown order check '{}': expected off, warn or strict",
                other
            ))),
        }
    }
}

/// Sort-order bookkeeping for [`MergeAdjacent`].
///
/// Closed IDs are only kept for the current (chromosome, start) run, since
/// an ID can never belong to another run. Leaving a run clears them. A start
/// that goes backwards, or a chromosome that returns after another one began,
/// is reported as out of order without keeping any IDs from earlier runs.
#[derive(Debug, Default)]
struct OrderTracker {
    chrom: Option<String>,
    start: Option<String>,
    finished_chroms: HashSet<String>,
    closed: HashSet<CanonicalId>,
}

impl OrderTracker {
    /// Record the first document of a new group. Returns `true` if it breaks
    /// the sort order.
    fn open(&mut self, id: &CanonicalId) -> bool {
        let (chrom, start) = id.sort_key();
        if self.chrom.as_deref() != Some(chrom) {
            if let Some(previous) = self.chrom.replace(chrom.to_string()) {
                self.finished_chroms.insert(previous);
            }
            self.start = Some(start.to_string());
            self.closed.clear();
            return self.finished_chroms.contains(chrom);
        }
        if self.start.as_deref() != Some(start) {
            let previous = self.start.replace(start.to_string());
            self.closed.clear();
            let previous = previous.and_then(|p| p.parse::<u64>().ok());
            return matches!(
                (previous, start.parse::<u64>().ok()),
                (Some(previous), Some(current)) if current < previous
            );
        }
        self.closed.contains(id)
    }

    fn close(&mut self, id: CanonicalId) {
        let (chrom, start) = id.sort_key();
        if self.chrom.as_deref() == Some(chrom) && self.start.as_deref() == Some(start) {
            self.closed.insert(id);
        }
    }

    #[cfg(test)]
    fn tracked_ids(&self) -> usize {
        self.closed.len()
    }
}

/// Streaming merge of consecutive documents with equal IDs.
///
/// Reads one document past the end of each group to detect the boundary. On
/// an upstream error the partially built group is discarded and the error is
/// returned; the iterator is then exhausted.
pub struct MergeAdjacent<I> {
    docs: I,
    pending: Option<VariantDocument>,
    order_check: OrderCheck,
    order: OrderTracker,
    merged_rows: usize,
    done: bool,
}

impl<I> MergeAdjacent<I>
where
    I: Iterator<Item = Result<VariantDocument, VarloadError>>,
{
    pub fn new(docs: I, order_check: OrderCheck) -> Self {
        Self {
            docs,
            pending: None,
            order_check,
            order: OrderTracker::default(),
            merged_rows: 0,
            done: false,
        }
    }

    /// Number of documents folded into an earlier one.
    pub fn merged_rows(&self) -> usize {
        self.merged_rows
    }

    pub fn get_ref(&self) -> &I {
        &self.docs
    }

    fn check_order(&mut self, id: &CanonicalId) -> Result<(), VarloadError> {
        if self.order_check == OrderCheck::Off || !self.order.open(id) {
            return Ok(());
        }
        match self.order_check {
            OrderCheck::Strict => Err(VarloadError::OutOfOrder { id: id.to_string() }),
            OrderCheck::Off | OrderCheck::Warn => {
                warn!("Variant {} is out of sort order; its rows may be split", id);
                Ok(())
            }
        }
    }

    fn fail(&mut self, err: VarloadError) -> Option<Result<VariantDocument, VarloadError>> {
        self.done = true;
        self.pending = None;
        Some(Err(err))
    }
}

impl<I> Iterator for MergeAdjacent<I>
where
    I: Iterator<Item = Result<VariantDocument, VarloadError>>,
{
    type Item = Result<VariantDocument, VarloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let doc = match self.docs.next() {
                Some(Ok(doc)) => doc,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.done = true;
                    return self.pending.take().map(Ok);
                }
            };

            if let Some(group) = self.pending.as_mut().filter(|g| g.id == doc.id) {
                merge_into(group, doc);
                self.merged_rows += 1;
                continue;
            }

            if let Err(e) = self.check_order(&doc.id) {
                return self.fail(e);
            }
            if let Some(finished) = self.pending.replace(doc) {
                if self.order_check != OrderCheck::Off {
                    self.order.close(finished.id.clone());
                }
                return Some(Ok(finished));
            }
        }
    }
}

/// Buffering merge that groups by ID regardless of input order.
///
/// The first call to `next` drains the upstream iterator. Documents are
/// emitted in the order their IDs were first seen.
pub struct MergeByKey<I> {
    docs: I,
    merged: Option<std::vec::IntoIter<VariantDocument>>,
    merged_rows: usize,
    done: bool,
}

impl<I> MergeByKey<I>
where
    I: Iterator<Item = Result<VariantDocument, VarloadError>>,
{
    pub fn new(docs: I) -> Self {
        Self {
            docs,
            merged: None,
            merged_rows: 0,
            done: false,
        }
    }

    /// Number of documents folded into an earlier one.
    pub fn merged_rows(&self) -> usize {
        self.merged_rows
    }

    pub fn get_ref(&self) -> &I {
        &self.docs
    }

    fn drain(&mut self) -> Result<Vec<VariantDocument>, VarloadError> {
        let mut groups: Vec<VariantDocument> = Vec::new();
        let mut index: HashMap<CanonicalId, usize> = HashMap::new();
        for doc in self.docs.by_ref() {
            let doc = doc?;
            match index.get(&doc.id) {
                Some(&i) => {
                    merge_into(&mut groups[i], doc);
                    self.merged_rows += 1;
                }
                None => {
                    index.insert(doc.id.clone(), groups.len());
                    groups.push(doc);
                }
            }
        }
        Ok(groups)
    }
}

impl<I> Iterator for MergeByKey<I>
where
    I: Iterator<Item = Result<VariantDocument, VarloadError>>,
{
    type Item = Result<VariantDocument, VarloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.merged.is_none() {
            match self.drain() {
                Ok(groups) => self.merged = Some(groups.into_iter()),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        let next = self.merged.as_mut().and_then(Iterator::next);
        if next.is_none() {
            self.done = true;
        }
        next.map(Ok)
    }
}
