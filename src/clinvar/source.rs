//! Reading the variant summary TSV.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use super::row::RawRow;
use crate::error::VarloadError;

const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Row counters kept by [`RowSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Data rows read (header and blank lines excluded).
    pub rows_read: usize,
    /// Rows dropped by the eligibility filter.
    pub ineligible: usize,
}

/// Lazy reader over a pre-sorted variant summary file.
///
/// Skips the header line, blank lines and ineligible rows. A row with the
/// wrong number of columns, or an I/O error, is returned once as `Err` and
/// ends the iteration.
pub struct RowSource<R> {
    reader: R,
    buf: String,
    line: usize,
    header_skipped: bool,
    done: bool,
    stats: SourceStats,
}

impl<R: BufRead> RowSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line: 0,
            header_skipped: false,
            done: false,
            stats: SourceStats::default(),
        }
    }

    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    fn fail(&mut self, err: VarloadError) -> Option<Result<RawRow, VarloadError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for RowSource<R> {
    type Item = Result<RawRow, VarloadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => return self.fail(e.into()),
            }
            self.line += 1;

            if !self.header_skipped {
                self.header_skipped = true;
                continue;
            }
            let text = self.buf.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }

            self.stats.rows_read += 1;
            let row = match RawRow::from_line(self.line, text) {
                Ok(row) => row,
                Err(e) => return self.fail(e),
            };
            let eligibility = row.eligibility();
            if eligibility.is_eligible() {
                return Some(Ok(row));
            }
            self.stats.ineligible += 1;
            debug!("Line {}: skipping ineligible row ({:?})", self.line, eligibility);
        }
    }
}

/// Open a variant summary file. `-` reads stdin; `.gz`/`.bgz` are decompressed.
pub fn open_tsv<P: AsRef<Path>>(path: P) -> Result<RowSource<Box<dyn BufRead>>, VarloadError> {
    let path = path.as_ref();
    if path == Path::new("-") {
        let stdin = BufReader::with_capacity(READ_BUFFER_SIZE, io::stdin());
        return Ok(RowSource::new(Box::new(stdin)));
    }

    let file = File::open(path).map_err(|e| VarloadError::Io {
        msg: format!("Failed to open {}: {}", path.display(), e),
    })?;
    let name = path.to_string_lossy();
    let reader: Box<dyn BufRead> = if name.ends_with(".gz") || name.ends_with(".bgz") {
        Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            MultiGzDecoder::new(file),
        ))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file))
    };
    Ok(RowSource::new(reader))
}
