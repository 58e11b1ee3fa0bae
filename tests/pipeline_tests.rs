//! End-to-end tests: TSV text in, merged documents out.

use std::io::Write;

use ferro_varload::clinvar::{columns, open_tsv, OrderCheck, VALID_COLUMN_NO};
use ferro_varload::config::{GroupingMode, PipelineConfig};
use ferro_varload::load::{load, sink_for, BulkSink, MemorySink, VariantPipeline};
use ferro_varload::{OutputFormat, VariantDocument, VarloadError};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};

const HEADER: &str = "#AlleleID\tType\tName\tGeneID\tGeneSymbol\tClinicalSignificance\tRS# (dbSNP)\tnsv (dbVar)\tRCVaccession\tTestedInGTR\tPhenotypeIDs\tOrigin\tAssembly\tChromosome\tStart\tStop\tCytogenetic\tReviewStatus\tHGVS(c.)\tHGVS(p.)\tNumberSubmitters\tLastEvaluated\tGuidelines\tOtherIDs\tVariantID";

/// Build one data line; unspecified columns hold the "-" placeholder.
fn row(overrides: &[(usize, &str)]) -> String {
    let mut fields = vec!["-"; VALID_COLUMN_NO];
    fields[columns::ALLELE_ID] = "15041";
    fields[columns::TYPE] = "single nucleotide variant";
    fields[columns::CHROMOSOME] = "1";
    fields[columns::START] = "1000";
    fields[columns::END] = "1000";
    fields[columns::HGVS_CODING] = "NM_000000.1:c.123A>G";
    for &(column, value) in overrides {
        fields[column] = value;
    }
    fields.join("\t")
}

fn tsv(rows: &[String]) -> String {
    let mut text = format!("{}\n", HEADER);
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    text
}

fn convert(text: &str) -> Vec<VariantDocument> {
    VariantPipeline::new(text.as_bytes(), &PipelineConfig::default())
        .collect::<Result<_, _>>()
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_substitution_row() {
    let docs = convert(&tsv(&[row(&[])]));
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id.as_str(), "chr1:g.1000A>G");
}

#[test]
fn test_deletion_row() {
    let docs = convert(&tsv(&[row(&[
        (columns::TYPE, "deletion"),
        (columns::CHROMOSOME, "2"),
        (columns::START, "500"),
        (columns::END, "510"),
        (columns::HGVS_CODING, "NM_000000.1:c.10_20del"),
    ])]));
    assert_eq!(docs[0].id.as_str(), "chr2:g.500_510del");
}

#[test]
fn test_duplicate_rows_merge_clinical_significance() {
    let dup = |significance| {
        row(&[
            (columns::TYPE, "duplication"),
            (columns::CHROMOSOME, "3"),
            (columns::START, "200"),
            (columns::END, "210"),
            (columns::HGVS_CODING, "NM_000000.1:c.100_101dupAT"),
            (columns::CLINICAL_SIGNIFICANCE, significance),
        ])
    };
    let docs = convert(&tsv(&[dup("Pathogenic"), dup("Benign")]));

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id.as_str(), "chr3:g.200_210dupAT");
    assert_eq!(
        docs[0].get("clinical_significance"),
        Some(&json!(["Pathogenic", "Benign"]))
    );
    // Identical fields are not promoted
    assert_eq!(docs[0].get("allele_id"), Some(&json!(15041)));
}

#[test]
fn test_other_ids_column() {
    let docs = convert(&tsv(&[row(&[(
        columns::OTHER_IDS,
        "MedGen:C0000001;OMIM:123456,OMIM:654321",
    )])]));
    assert_eq!(
        docs[0].get("other_ids"),
        Some(&json!({"MedGen": "C0000001", "OMIM": [123456, 654321]}))
    );
}

// =============================================================================
// Document shape
// =============================================================================

#[test]
fn test_normalized_document() {
    let docs = convert(&tsv(&[row(&[
        (columns::GENE_ID, "672"),
        (columns::GENE_SYMBOL, "BRCA1"),
        (columns::CLINICAL_SIGNIFICANCE, "Pathogenic"),
        (columns::RCV_ACCESSION, "RCV000000001;RCV000000002"),
        (columns::ASSEMBLY, "GRCh38"),
        (columns::NUMBER_SUBMITTERS, "3"),
    ])]));
    let doc = serde_json::to_value(&docs[0]).unwrap();

    assert_eq!(
        doc,
        json!({
            "_id": "chr1:g.1000A>G",
            "clinvar": {
                "allele_id": 15041,
                "genome": {"assembly": "GRCh38", "chr": 1, "start": 1000, "end": 1000},
                "type": "single nucleotide variant",
                "gene": {"id": 672, "symbol": "BRCA1"},
                "clinical_significance": "Pathogenic",
                "rcv_accession": ["RCV000000001", "RCV000000002"],
                "hgvs": {"coding": "NM_000000.1:c.123A>G"},
                "number_submitters": 3,
            }
        })
    );
}

#[test]
fn test_no_sentinel_survives() {
    let docs = convert(&tsv(&[row(&[])]));
    fn has_sentinel(value: &Value) -> bool {
        match value {
            Value::String(s) => s == "-",
            Value::Array(items) => items.iter().any(has_sentinel),
            Value::Object(map) => map.values().any(has_sentinel),
            _ => false,
        }
    }
    assert!(!has_sentinel(&docs[0].source()));
    assert!(docs[0].get("gene").is_none());
    assert!(docs[0].get("phenotype_id").is_none());
}

// =============================================================================
// Input handling
// =============================================================================

#[test]
fn test_ineligible_rows_are_dropped() {
    let text = tsv(&[
        row(&[(columns::HGVS_CODING, "-")]),
        row(&[(columns::HGVS_CODING, "NM_000000.1:c.?")]),
        row(&[(columns::CHROMOSOME, "")]),
        row(&[(columns::HGVS_CODING, "NP_000000.1:p.Arg1Cys")]),
        row(&[(columns::CHROMOSOME, "9")]),
    ]);
    let mut pipeline = VariantPipeline::new(text.as_bytes(), &PipelineConfig::default());
    let docs: Vec<_> = pipeline.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id.as_str(), "chr9:g.1000A>G");
    let stats = pipeline.stats();
    assert_eq!(stats.rows_read, 5);
    assert_eq!(stats.ineligible, 4);
}

#[test]
fn test_wrong_column_count_is_fatal() {
    for count in [VALID_COLUMN_NO - 1, VALID_COLUMN_NO + 1] {
        let short_or_long = vec!["1"; count].join("\t");
        let text = tsv(&[row(&[]), short_or_long, row(&[(columns::CHROMOSOME, "2")])]);
        let results: Vec<_> =
            VariantPipeline::new(text.as_bytes(), &PipelineConfig::default()).collect();

        // The pending group is discarded along with everything after it
        assert_eq!(
            results,
            vec![Err(VarloadError::MalformedRow {
                line: 3,
                found: count
            })]
        );
    }
}

#[test]
fn test_gzip_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("variant_summary.txt.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder
        .write_all(tsv(&[row(&[]), row(&[(columns::CHROMOSOME, "2")])]).as_bytes())
        .unwrap();
    encoder.finish().unwrap();

    let source = open_tsv(&path).unwrap();
    let docs: Vec<_> = VariantPipeline::from_source(source, &PipelineConfig::default())
        .collect::<Result<_, _>>()
        .unwrap();
    let ids: Vec<_> = docs.iter().map(|d| d.id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["chr1:g.1000A>G", "chr2:g.1000A>G"]);
}

#[test]
fn test_plain_file_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(tsv(&[row(&[])]).as_bytes()).unwrap();
    let source = open_tsv(file.path()).unwrap();
    assert_eq!(source.count(), 1);
}

// =============================================================================
// Grouping
// =============================================================================

#[test]
fn test_unsorted_input_modes() {
    let text = tsv(&[
        row(&[(columns::CLINICAL_SIGNIFICANCE, "Pathogenic")]),
        row(&[(columns::CHROMOSOME, "2")]),
        row(&[(columns::CLINICAL_SIGNIFICANCE, "Benign")]),
    ]);
    let run = |grouping, order_check| {
        let config = PipelineConfig {
            grouping,
            order_check,
        };
        VariantPipeline::new(text.as_bytes(), &config).collect::<Vec<_>>()
    };

    let warned = run(GroupingMode::Adjacent, OrderCheck::Warn);
    assert_eq!(warned.len(), 3);
    assert!(warned.iter().all(Result::is_ok));

    let strict = run(GroupingMode::Adjacent, OrderCheck::Strict);
    assert!(matches!(
        strict.last(),
        Some(Err(VarloadError::OutOfOrder { .. }))
    ));

    let materialized = run(GroupingMode::Materialized, OrderCheck::Strict);
    assert_eq!(materialized.len(), 2);
    let first = materialized[0].as_ref().unwrap();
    assert_eq!(
        first.get("clinical_significance"),
        Some(&json!(["Pathogenic", "Benign"]))
    );
}

#[test]
fn test_strict_order_check_rejects_decreasing_start() {
    let text = tsv(&[
        row(&[]),
        row(&[(columns::START, "2000"), (columns::END, "2000")]),
        row(&[(columns::START, "1500"), (columns::END, "1500")]),
    ]);
    let config = PipelineConfig {
        order_check: OrderCheck::Strict,
        ..Default::default()
    };
    let results: Vec<_> = VariantPipeline::new(text.as_bytes(), &config).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[1],
        Err(VarloadError::OutOfOrder {
            id: "chr1:g.1500A>G".to_string()
        })
    );
}

#[test]
fn test_strict_order_check_accepts_sorted_input() {
    let starts: Vec<String> = (0..500).map(|i| (1000 + i * 3).to_string()).collect();
    let mut rows = vec![];
    for start in &starts {
        rows.push(row(&[(columns::START, start), (columns::END, start)]));
        rows.push(row(&[(columns::START, start), (columns::END, start)]));
    }
    rows.push(row(&[(columns::CHROMOSOME, "2")]));
    let config = PipelineConfig {
        order_check: OrderCheck::Strict,
        ..Default::default()
    };
    let docs: Vec<_> = VariantPipeline::new(tsv(&rows).as_bytes(), &config)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(docs.len(), 501);
}

// =============================================================================
// Sinks
// =============================================================================

#[test]
fn test_load_into_memory_sink() {
    let text = tsv(&[row(&[]), row(&[]), row(&[(columns::CHROMOSOME, "2")])]);
    let mut pipeline = VariantPipeline::new(text.as_bytes(), &PipelineConfig::default());
    let mut sink = MemorySink::new();
    let mut failures = Vec::new();
    let report = load(pipeline.by_ref(), &mut sink, |f| failures.push(f)).unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 0);
    assert!(failures.is_empty());
    assert_eq!(pipeline.stats().merged_rows, 1);

    let ids: Vec<_> = sink
        .into_documents()
        .into_iter()
        .map(|d| d.id.into_string())
        .collect();
    assert_eq!(ids, vec!["chr1:g.1000A>G", "chr2:g.1000A>G"]);
}

#[test]
fn test_split_group_surfaces_as_write_failure() {
    // With order-check=warn the late rows become a second document with the
    // same _id, which a create-only store rejects.
    let text = tsv(&[row(&[]), row(&[(columns::CHROMOSOME, "2")]), row(&[])]);
    let pipeline = VariantPipeline::new(text.as_bytes(), &PipelineConfig::default());
    let mut sink = MemorySink::new();
    let mut failures = Vec::new();
    let report = load(pipeline, &mut sink, |f| failures.push(f)).unwrap();

    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(failures[0].id.as_str(), "chr1:g.1000A>G");
}

#[test]
fn test_bulk_output() {
    let text = tsv(&[row(&[])]);
    let pipeline = VariantPipeline::new(text.as_bytes(), &PipelineConfig::default());
    let mut sink = BulkSink::new(Vec::new(), "clinvar_hg38");
    load(pipeline, &mut sink, |_| {}).unwrap();

    let out = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        json!({"index": {"_index": "clinvar_hg38", "_id": "chr1:g.1000A>G"}})
    );
    assert_eq!(lines[1]["clinvar"]["allele_id"], json!(15041));
}

#[test]
fn test_fatal_error_keeps_written_documents() {
    let text = tsv(&[
        row(&[]),
        row(&[(columns::CHROMOSOME, "2")]),
        "too\tfew".to_string(),
    ]);
    let pipeline = VariantPipeline::new(text.as_bytes(), &PipelineConfig::default());
    let mut out = Vec::new();
    let result = {
        let mut sink = sink_for(OutputFormat::Jsonl, &mut out, "unused");
        load(pipeline, &mut sink, |_| {})
    };

    assert!(matches!(result, Err(VarloadError::MalformedRow { .. })));
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}
