//! Output formatting utilities for CLI operations

use std::io::{self, Write};
use std::str::FromStr;

use serde_json::json;

use crate::clinvar::{ClassifiedVariant, MutationKind};
use crate::error::VarloadError;
use crate::load::{LoadReport, LoadStats};

/// Output format for `classify`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON object
    Json,
}

impl FromStr for ClassifyFormat {
    type Err = std::convert::Infallible;

    /// Parse a format name; anything other than `json` means text.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_varload::cli::ClassifyFormat;
    ///
    /// assert_eq!("json".parse::<ClassifyFormat>().unwrap(), ClassifyFormat::Json);
    /// assert_eq!("text".parse::<ClassifyFormat>().unwrap(), ClassifyFormat::Text);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => ClassifyFormat::Json,
            _ => ClassifyFormat::Text,
        })
    }
}

/// Write one classification result.
pub fn output_classification<W: Write>(
    writer: &mut W,
    notation: &str,
    variant: &ClassifiedVariant,
    format: ClassifyFormat,
) -> io::Result<()> {
    let id = variant.canonical_id();
    match format {
        ClassifyFormat::Json => {
            let value = json!({
                "input": notation,
                "kind": variant.kind,
                "fragment": variant.fragment,
                "id": id,
            });
            writeln!(writer, "{}", value)
        }
        ClassifyFormat::Text => writeln!(writer, "{}\t{}\t{}", notation, variant.kind, id),
    }
}

/// Write an error with its code, e.g. `error[E1001]: ...`.
///
/// # Examples
///
/// ```
/// use ferro_varload::cli::output_error;
/// use ferro_varload::VarloadError;
///
/// let mut buffer = Vec::new();
/// output_error(&mut buffer, &VarloadError::config("bad value")).unwrap();
/// assert!(String::from_utf8(buffer).unwrap().starts_with("error[E8001]"));
/// ```
pub fn output_error<W: Write>(writer: &mut W, error: &VarloadError) -> io::Result<()> {
    writeln!(writer, "error[{}]: {}", error.code(), error)
}

/// Write the end-of-run summary.
pub fn write_summary<W: Write>(
    writer: &mut W,
    stats: &LoadStats,
    report: &LoadReport,
) -> io::Result<()> {
    writeln!(writer, "Rows read:       {}", stats.rows_read)?;
    writeln!(writer, "Ineligible:      {}", stats.ineligible)?;
    writeln!(writer, "Unclassifiable:  {}", stats.unclassifiable)?;
    writeln!(writer, "Documents:       {}", stats.documents)?;
    writeln!(writer, "Merged rows:     {}", stats.merged_rows)?;

    let mut kinds: Vec<(MutationKind, usize)> =
        stats.by_kind.iter().map(|(kind, n)| (*kind, *n)).collect();
    kinds.sort_by_key(|(kind, _)| kind.as_str());
    for (kind, n) in kinds {
        writeln!(writer, "  {:<14} {}", kind.as_str(), n)?;
    }

    writeln!(writer, "Written:         {}", report.written)?;
    writeln!(writer, "Write failures:  {}", report.failed)?;
    writeln!(
        writer,
        "Elapsed:         {:.2}s ({:.0} docs/s)",
        report.duration.as_secs_f64(),
        report.docs_per_second()
    )
}
