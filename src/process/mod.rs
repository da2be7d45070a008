// src/process/mod.rs
//! The cleaning pipeline: decode → parse → rename → normalise/coerce → write.

pub mod convert;
pub mod decode;
pub mod normalize;
pub mod raw_table;
pub mod rename;
pub mod utils;

use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::schema::{records_to_batch, write_parquet_atomic, CanonicalRecord};
use convert::{clean_row, ColumnIndex};
use decode::{decode_bytes, Encoding};
use normalize::Normalizer;
use raw_table::parse_delimited;
use rename::{canonicalize_headers, check_required, HeaderMap};

/// Outcome of one successful run, as reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub encoding: Encoding,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_written: usize,
    pub artifact_bytes: u64,
}

/// In-memory result of cleaning one extract.
#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub records: Vec<CanonicalRecord>,
    pub encoding: Encoding,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// A configuration compiled into lookup tables, ready to run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cfg: PipelineConfig,
    delimiter: u8,
    headers: HeaderMap,
    normalizer: Normalizer,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Result<Self> {
        cfg.validate()?;
        let delimiter = cfg.delimiter_byte()?;
        let headers = HeaderMap::new(&cfg.header_aliases)?;
        let normalizer = Normalizer::new(&cfg)?;
        Ok(Self {
            cfg,
            delimiter,
            headers,
            normalizer,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Clean raw extract bytes. `source` is only used in error messages.
    pub fn clean(&self, bytes: &[u8], source: &Path) -> Result<Cleaned> {
        let (text, encoding) =
            decode_bytes(bytes, &self.cfg.encodings).map_err(|e| PipelineError::Decode {
                path: source.to_path_buf(),
                tried: self
                    .cfg
                    .encodings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                source: e,
            })?;
        info!(%encoding, "source decoded");

        let mut table = parse_delimited(&text, self.delimiter)?;
        info!(
            columns = table.headers.len(),
            rows = table.rows.len(),
            "source parsed"
        );

        canonicalize_headers(&mut table, &self.headers);
        check_required(&table, &self.cfg.required_columns)?;

        let cols = ColumnIndex::locate(&table);
        let rows_read = table.rows.len();
        let records: Vec<CanonicalRecord> = table
            .rows
            .iter()
            .filter_map(|row| clean_row(row, &cols, &self.normalizer))
            .collect();
        let rows_dropped = rows_read - records.len();
        debug!(rows_read, rows_dropped, "rows cleaned");

        Ok(Cleaned {
            records,
            encoding,
            rows_read,
            rows_dropped,
        })
    }

    /// Read the configured input, clean it, and replace the configured
    /// artifact. Nothing is written unless every step before the write
    /// succeeds.
    #[tracing::instrument(level = "info", skip(self), fields(input = %self.cfg.input_path.display()))]
    pub fn run(&self) -> Result<RunSummary> {
        let input = &self.cfg.input_path;
        if !input.is_file() {
            return Err(PipelineError::SourceMissing {
                path: input.clone(),
            });
        }
        let bytes = fs::read(input)?;
        info!(bytes = bytes.len(), "read source");

        let cleaned = self.clean(&bytes, input)?;
        let batch = records_to_batch(&cleaned.records)?;
        let artifact_bytes = write_parquet_atomic(&batch, &self.cfg.output_path)?;

        let summary = RunSummary {
            input_path: input.clone(),
            output_path: self.cfg.output_path.clone(),
            encoding: cleaned.encoding,
            rows_read: cleaned.rows_read,
            rows_dropped: cleaned.rows_dropped,
            rows_written: cleaned.records.len(),
            artifact_bytes,
        };
        info!(
            rows_read = summary.rows_read,
            rows_dropped = summary.rows_dropped,
            rows_written = summary.rows_written,
            output = %summary.output_path.display(),
            "pipeline finished"
        );
        Ok(summary)
    }
}

/// Compile `cfg` and run it once.
pub fn run(cfg: PipelineConfig) -> Result<RunSummary> {
    Pipeline::new(cfg)?.run()
}
