//! Running the conversion end to end and handing documents to a store.
//!
//! [`VariantPipeline`] chains the row source, document stream and merger
//! according to a [`PipelineConfig`](crate::config::PipelineConfig).
//! [`load`] pulls merged documents from any iterator into a [`DocumentSink`]
//! and reports each failed write to a caller-supplied handler.
//!
//! # Example
//!
//! ```
//! use ferro_varload::config::PipelineConfig;
//! use ferro_varload::load::{load, MemorySink, VariantPipeline};
//!
//! let mut fields = vec!["-"; 25];
//! fields[1] = "single nucleotide variant";
//! fields[13] = "1";
//! fields[14] = "1000";
//! fields[15] = "1000";
//! fields[18] = "NM_000000.1:c.123A>G";
//! let tsv = format!("#header\n{}\n", fields.join("\t"));
//!
//! let mut pipeline = VariantPipeline::new(tsv.as_bytes(), &PipelineConfig::default());
//! let mut sink = MemorySink::new();
//! let report = load(pipeline.by_ref(), &mut sink, |_| {}).unwrap();
//!
//! assert_eq!(report.written, 1);
//! assert_eq!(sink.documents()[0].id.as_str(), "chr1:g.1000A>G");
//! ```

mod pipeline;
mod sink;

pub use pipeline::{LoadStats, VariantPipeline};
pub use sink::{
    load, sink_for, BulkSink, DocumentSink, JsonLinesSink, LoadReport, MemorySink, WriteFailure,
    WriteOutcome,
};
