// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-varload CLI
//!
//! Convert the ClinVar variant summary into search documents.

use clap::{Parser, Subcommand};
use ferro_varload::cli::{output_classification, output_error, write_summary, ClassifyFormat};
use ferro_varload::load::sink_for;
use ferro_varload::{
    classify_notation, load, open_tsv, VariantPipeline, VarloadConfig, VarloadError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ferro-varload")]
#[command(author, version, about = "ClinVar variant summary to search document converter")]
#[command(
    long_about = "Classify, normalize and merge ClinVar variant_summary rows into search documents.

The input must be sorted so that rows of the same variant are adjacent, e.g.:
  (head -n1 variant_summary.txt; tail -n+2 variant_summary.txt | sort -t$'\\t' -k14,14 -k15,15n -k16,16n -k21,21n) > sorted.tsv

Examples:
  ferro-varload convert -i sorted.tsv -o clinvar.jsonl
  ferro-varload convert -i sorted.tsv.gz --format bulk --index clinvar_hg38 > bulk.ndjson
  ferro-varload classify 'NM_000000.1:c.123A>G' --chrom 1 --start 1000 --end 1000"
)]
struct Cli {
    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a sorted variant summary TSV into documents
    Convert {
        /// Input TSV, optionally gzipped (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_parser = ["jsonl", "bulk"])]
        format: Option<String>,

        /// Index name for bulk action lines
        #[arg(long)]
        index: Option<String>,

        /// How rows of the same variant are grouped
        #[arg(long, value_parser = ["adjacent", "materialized"])]
        grouping: Option<String>,

        /// Handling of variants split across non-adjacent rows
        #[arg(long, value_parser = ["off", "warn", "strict"])]
        order_check: Option<String>,

        /// Configuration file (default: .ferro-varload.toml or ~/.config/ferro/varload.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show a progress spinner on stderr
        #[arg(long)]
        progress: bool,
    },

    /// Print the canonical ID for one coding notation
    Classify {
        /// Coding notation, e.g. NM_000000.1:c.123A>G
        notation: String,

        /// Chromosome
        #[arg(long)]
        chrom: String,

        /// Start position
        #[arg(long)]
        start: String,

        /// End position
        #[arg(long)]
        end: String,

        /// Variant type column value (e.g. deletion, indel)
        #[arg(long = "type", default_value = "single nucleotide variant")]
        variant_type: String,

        /// Output format
        #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            index,
            grouping,
            order_check,
            config,
            progress,
        } => resolve_config(
            config.as_deref(),
            grouping.as_deref(),
            order_check.as_deref(),
            format.as_deref(),
            index.as_deref(),
        )
        .and_then(|config| run_convert(&input, output.as_deref(), &config, progress)),
        Commands::Classify {
            notation,
            chrom,
            start,
            end,
            variant_type,
            format,
        } => run_classify(&notation, &chrom, &start, &end, &variant_type, &format),
    };

    if let Err(e) = result {
        let _ = output_error(&mut io::stderr(), &e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) -> Result<(), String> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| format!("Invalid log level '{}': {}", level, e))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}

/// Load the config file (explicit path or default locations) and apply CLI overrides.
fn resolve_config(
    path: Option<&Path>,
    grouping: Option<&str>,
    order_check: Option<&str>,
    format: Option<&str>,
    index: Option<&str>,
) -> Result<VarloadConfig, VarloadError> {
    let base = match path {
        Some(path) => {
            info!("Using config {}", path.display());
            VarloadConfig::load_from_path(path)?
        }
        None => VarloadConfig::load()?.unwrap_or_default(),
    };
    base.merge_with_cli(grouping, order_check, format, index)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, VarloadError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path).map_err(|e| VarloadError::Io {
                msg: format!("Failed to create {}: {}", path.display(), e),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn run_convert(
    input: &Path,
    output: Option<&Path>,
    config: &VarloadConfig,
    progress: bool,
) -> Result<(), VarloadError> {
    info!(
        "Converting {} (grouping={:?}, order-check={:?}, format={:?})",
        input.display(),
        config.pipeline.grouping,
        config.pipeline.order_check,
        config.output.format
    );

    let source = open_tsv(input)?;
    let mut pipeline = VariantPipeline::from_source(source, &config.pipeline);
    let mut sink = sink_for(config.output.format, open_output(output)?, &config.output.index);

    let pb = if progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let documents = pipeline.by_ref().inspect(|doc| {
        if let (Some(pb), Ok(_)) = (&pb, doc) {
            pb.inc(1);
            pb.set_message(format!("{} documents", pb.position()));
        }
    });
    let report = load(documents, &mut sink, |failure| {
        warn!("Write failed for {}: {}", failure.id, failure.reason);
    });

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let stats = pipeline.stats();
    let report = report?;

    stats.log_summary();
    write_summary(&mut io::stderr(), &stats, &report)?;
    Ok(())
}

fn run_classify(
    notation: &str,
    chrom: &str,
    start: &str,
    end: &str,
    variant_type: &str,
    format: &str,
) -> Result<(), VarloadError> {
    let format: ClassifyFormat = format.parse().unwrap_or_default();
    match classify_notation(notation, variant_type, chrom, start, end) {
        Ok(variant) => {
            output_classification(&mut io::stdout(), notation, &variant, format)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("unclassifiable: {}", e);
            std::process::exit(3);
        }
    }
}
