use arrow::record_batch::RecordBatch;
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{fs, io::Write, path::Path};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Result;

/// Write `batch` to `path` as Parquet, replacing any previous artifact.
///
/// The data goes to a temporary file in the destination directory first and
/// is renamed over `path` only once fully written and synced, so readers see
/// either the old artifact or the new one. The directory is created if
/// needed. Returns the size of the written file in bytes.
pub fn write_parquet_atomic(batch: &RecordBatch, path: &Path) -> Result<u64> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "created output directory");
    }

    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!(tmp = %tmp.path().display(), "writing artifact to temporary file");

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    {
        let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), batch.schema(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    tmp.persist(path).map_err(|e| e.error)?;
    let bytes = fs::metadata(path)?.len();
    info!(path = %path.display(), bytes, rows = batch.num_rows(), "artifact replaced");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{records_to_batch, CanonicalRecord};
    use anyhow::Result;
    use tempfile::tempdir;

    fn sample() -> Vec<CanonicalRecord> {
        vec![CanonicalRecord {
            nama_penerima: "Siti".into(),
            provinsi: Some("Kalimantan Timur".into()),
            usia: 51,
            jenis_pekerjaan: Some("Nelayan".into()),
            skor_kse: 47,
            status_kse: Some("Layak".into()),
            pendapatan: Some(750000.0),
        }]
    }

    #[test]
    fn creates_missing_directories_and_leaves_no_temp_files() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("processed_data/nested/out.parquet");
        let batch = records_to_batch(&sample())?;

        let bytes = write_parquet_atomic(&batch, &out)?;
        assert!(bytes > 0);
        assert!(out.exists());

        let entries: Vec<_> = fs::read_dir(out.parent().unwrap())?.collect();
        assert_eq!(entries.len(), 1);
        Ok(())
    }

    #[test]
    fn rewriting_replaces_previous_artifact() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("out.parquet");
        fs::write(&out, b"stale")?;

        let batch = records_to_batch(&sample())?;
        write_parquet_atomic(&batch, &out)?;
        let first = fs::read(&out)?;
        assert_ne!(first, b"stale");

        write_parquet_atomic(&batch, &out)?;
        assert_eq!(fs::read(&out)?, first);
        Ok(())
    }
}
