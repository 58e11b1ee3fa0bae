//! Document sinks and the load driver.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::clinvar::{CanonicalId, VariantDocument, SOURCE_KEY};
use crate::config::OutputFormat;
use crate::error::VarloadError;

/// A rejected write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// `_id` of the document that was not written.
    pub id: CanonicalId,
    /// Why the sink rejected it.
    pub reason: String,
}

impl WriteFailure {
    pub fn new(id: &CanonicalId, reason: impl Into<String>) -> Self {
        Self {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.reason)
    }
}

/// Acknowledgment for one write.
pub type WriteOutcome = Result<(), WriteFailure>;

/// Destination for finished documents.
///
/// Writes are independent and unordered from the store's point of view; a
/// failed write does not affect later ones.
pub trait DocumentSink {
    /// Write one document.
    fn write(&mut self, doc: &VariantDocument) -> WriteOutcome;

    /// Flush buffered output. A failure here is fatal for the run.
    fn flush(&mut self) -> Result<(), VarloadError> {
        Ok(())
    }
}

impl<S: DocumentSink + ?Sized> DocumentSink for Box<S> {
    fn write(&mut self, doc: &VariantDocument) -> WriteOutcome {
        (**self).write(doc)
    }

    fn flush(&mut self) -> Result<(), VarloadError> {
        (**self).flush()
    }
}

/// Append `value` and a newline to `buf`.
fn encode_line(buf: &mut Vec<u8>, value: &impl serde::Serialize) -> serde_json::Result<()> {
    serde_json::to_writer(&mut *buf, value)?;
    buf.push(b'\n');
    Ok(())
}

/// Hand a fully encoded record to the writer in a single `write_all`.
fn write_record<W: Write>(writer: &mut W, record: &[u8], id: &CanonicalId) -> WriteOutcome {
    writer
        .write_all(record)
        .map_err(|e| WriteFailure::new(id, e.to_string()))
}

/// Writes one `{"_id": ..., "clinvar": ...}` object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    buf: Vec<u8>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentSink for JsonLinesSink<W> {
    fn write(&mut self, doc: &VariantDocument) -> WriteOutcome {
        self.buf.clear();
        encode_line(&mut self.buf, doc).map_err(|e| WriteFailure::new(&doc.id, e.to_string()))?;
        write_record(&mut self.writer, &self.buf, &doc.id)
    }

    fn flush(&mut self) -> Result<(), VarloadError> {
        Ok(self.writer.flush()?)
    }
}

/// Writes bulk-API NDJSON: an `index` action line, then the source line.
///
/// Both lines are encoded before either is written, so an action line never
/// reaches the output without its source.
pub struct BulkSink<W: Write> {
    writer: W,
    index: String,
    buf: Vec<u8>,
}

impl<W: Write> BulkSink<W> {
    pub fn new(writer: W, index: impl Into<String>) -> Self {
        Self {
            writer,
            index: index.into(),
            buf: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentSink for BulkSink<W> {
    fn write(&mut self, doc: &VariantDocument) -> WriteOutcome {
        let action = json!({"index": {"_index": self.index, "_id": doc.id}});
        let source = json!({ SOURCE_KEY: doc.body });
        self.buf.clear();
        encode_line(&mut self.buf, &action)
            .and_then(|()| encode_line(&mut self.buf, &source))
            .map_err(|e| WriteFailure::new(&doc.id, e.to_string()))?;
        write_record(&mut self.writer, &self.buf, &doc.id)
    }

    fn flush(&mut self) -> Result<(), VarloadError> {
        Ok(self.writer.flush()?)
    }
}

/// Keeps documents in memory. Rejects a second document with the same `_id`,
/// the way a store with create-only semantics would.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Vec<VariantDocument>,
    seen: HashSet<CanonicalId>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[VariantDocument] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<VariantDocument> {
        self.documents
    }
}

impl DocumentSink for MemorySink {
    fn write(&mut self, doc: &VariantDocument) -> WriteOutcome {
        if !self.seen.insert(doc.id.clone()) {
            return Err(WriteFailure::new(&doc.id, "document already exists"));
        }
        self.documents.push(doc.clone());
        Ok(())
    }
}

/// Build the file sink for an output format.
pub fn sink_for<'a, W: Write + 'a>(
    format: OutputFormat,
    writer: W,
    index: &str,
) -> Box<dyn DocumentSink + 'a> {
    match format {
        OutputFormat::Jsonl => Box::new(JsonLinesSink::new(writer)),
        OutputFormat::Bulk => Box::new(BulkSink::new(writer, index)),
    }
}

/// Outcome of a [`load`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Documents the sink accepted.
    pub written: usize,
    /// Documents the sink rejected.
    pub failed: usize,
    /// Wall time spent loading.
    pub duration: Duration,
}

impl LoadReport {
    /// Documents per second.
    ///
    /// Returns 0.0 if the duration is too short to give a meaningful rate.
    pub fn docs_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs < f64::EPSILON {
            0.0
        } else {
            (self.written + self.failed) as f64 / secs
        }
    }
}

/// Drive `documents` into `sink`.
///
/// Each rejected write is passed to `on_failure` and counted; loading
/// continues. The first `Err` from `documents` stops the run and is returned
/// after flushing what was already written.
pub fn load<I, S, F>(documents: I, sink: &mut S, mut on_failure: F) -> Result<LoadReport, VarloadError>
where
    I: IntoIterator<Item = Result<VariantDocument, VarloadError>>,
    S: DocumentSink + ?Sized,
    F: FnMut(WriteFailure),
{
    let start = Instant::now();
    let mut report = LoadReport::default();

    for doc in documents {
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => {
                sink.flush()?;
                return Err(e);
            }
        };
        match sink.write(&doc) {
            Ok(()) => report.written += 1,
            Err(failure) => {
                debug!("Write failed for {}", failure);
                report.failed += 1;
                on_failure(failure);
            }
        }
    }

    sink.flush()?;
    report.duration = start.elapsed();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn doc(locus: &str, body: Value) -> VariantDocument {
        let Value::Object(body) = body else {
            panic!("body must be an object");
        };
        VariantDocument {
            id: CanonicalId::new("1", locus),
            body,
        }
    }

    struct FailingSink;

    impl DocumentSink for FailingSink {
        fn write(&mut self, doc: &VariantDocument) -> WriteOutcome {
            Err(WriteFailure::new(&doc.id, "store unavailable"))
        }
    }

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write(&doc("1A>G", json!({"allele_id": 1}))).unwrap();
        sink.write(&doc("2C>T", json!({}))).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(
            first,
            json!({"_id": "chr1:g.1A>G", "clinvar": {"allele_id": 1}})
        );
    }

    #[test]
    fn test_bulk_sink_writes_action_and_source() {
        let mut sink = BulkSink::new(Vec::new(), "clinvar_test");
        sink.write(&doc("1A>G", json!({"allele_id": 1}))).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"index": {"_index": "clinvar_test", "_id": "chr1:g.1A>G"}}),
                json!({"clinvar": {"allele_id": 1}}),
            ]
        );
    }

    /// Accepts writes except for the `fail_on`-th call.
    struct FlakyWriter {
        written: Vec<u8>,
        calls: usize,
        fail_on: usize,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bulk_sink_failed_write_leaves_no_orphan_action() {
        let writer = FlakyWriter {
            written: Vec::new(),
            calls: 0,
            fail_on: 2,
        };
        let mut sink = BulkSink::new(writer, "clinvar_test");
        assert!(sink.write(&doc("1A>G", json!({"allele_id": 1}))).is_ok());
        let failure = sink.write(&doc("2C>T", json!({"allele_id": 2}))).unwrap_err();
        assert_eq!(failure.id.as_str(), "chr1:g.2C>T");
        assert!(sink.write(&doc("3G>A", json!({"allele_id": 3}))).is_ok());

        let text = String::from_utf8(sink.into_inner().written).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"index": {"_index": "clinvar_test", "_id": "chr1:g.1A>G"}}),
                json!({"clinvar": {"allele_id": 1}}),
                json!({"index": {"_index": "clinvar_test", "_id": "chr1:g.3G>A"}}),
                json!({"clinvar": {"allele_id": 3}}),
            ]
        );
    }

    #[test]
    fn test_memory_sink_rejects_duplicate_ids() {
        let mut sink = MemorySink::new();
        assert!(sink.write(&doc("1A>G", json!({}))).is_ok());
        let failure = sink.write(&doc("1A>G", json!({}))).unwrap_err();
        assert_eq!(failure.id.as_str(), "chr1:g.1A>G");
        assert_eq!(sink.documents().len(), 1);
    }

    #[test]
    fn test_load_reports_failures_to_handler() {
        let docs = vec![
            Ok(doc("1A>G", json!({}))),
            Ok(doc("1A>G", json!({}))),
            Ok(doc("2A>G", json!({}))),
        ];
        let mut sink = MemorySink::new();
        let mut failures = Vec::new();
        let report = load(docs, &mut sink, |f| failures.push(f)).unwrap();

        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].to_string(), "chr1:g.1A>G: document already exists");
    }

    #[test]
    fn test_load_continues_after_every_failure() {
        let docs = (0..5).map(|i| Ok(doc(&format!("{}A>G", i), json!({}))));
        let mut count = 0;
        let report = load(docs, &mut FailingSink, |_| count += 1).unwrap();
        assert_eq!(report.failed, 5);
        assert_eq!(report.written, 0);
        assert_eq!(count, 5);
    }

    #[test]
    fn test_load_stops_on_pipeline_error() {
        let docs = vec![
            Ok(doc("1A>G", json!({}))),
            Err(VarloadError::MalformedRow { line: 3, found: 24 }),
            Ok(doc("2A>G", json!({}))),
        ];
        let mut sink = MemorySink::new();
        let result = load(docs, &mut sink, |_| {});
        assert!(matches!(result, Err(VarloadError::MalformedRow { .. })));
        assert_eq!(sink.documents().len(), 1);
    }

    #[test]
    fn test_sink_for_format() {
        let mut out = Vec::new();
        {
            let mut sink = sink_for(OutputFormat::Bulk, &mut out, "variants");
            let report = load(vec![Ok(doc("1A>G", json!({})))], &mut sink, |_| {}).unwrap();
            assert_eq!(report.written, 1);
        }
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);

        let empty = VariantDocument::new(CanonicalId::new("1", "1A>G"));
        let mut out = Vec::new();
        {
            let mut sink = sink_for(OutputFormat::Jsonl, &mut out, "unused");
            load(vec![Ok(empty)], &mut sink, |_| {}).unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"_id\":\"chr1:g.1A>G\",\"clinvar\":{}}\n"
        );
    }
}
