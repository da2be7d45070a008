//! Consumer side of the artifact contract: load, validate, aggregate.

pub mod views;

use arrow::{
    array::{Array, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{fs::File, path::Path};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::schema::{
    canonical_schema, CanonicalRecord, JENIS_PEKERJAAN, NAMA_PENERIMA, PENDAPATAN, PROVINSI,
    SKOR_KSE, STATUS_KSE, USIA,
};

pub use views::{
    counts_by_province_status, lowest_kse, occupation_distribution, province_stats,
    provinces, unemployed_by_province, ProvinceStats,
};

/// Columns a reader cannot render without. `pendapatan` is optional.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    NAMA_PENERIMA,
    PROVINSI,
    USIA,
    JENIS_PEKERJAAN,
    SKOR_KSE,
    STATUS_KSE,
];

/// Check an artifact schema against the contract: every required column
/// present, and every canonical column that is present carries its
/// canonical type.
pub fn validate_schema(schema: &Schema) -> Result<(), ReportError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| schema.field_with_name(name).is_err())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::SchemaViolation { missing });
    }

    for expected in canonical_schema().fields() {
        if let Ok(found) = schema.field_with_name(expected.name()) {
            if found.data_type() != expected.data_type() {
                return Err(ReportError::ColumnType {
                    column: expected.name().clone(),
                    expected: expected.data_type().to_string(),
                    found: found.data_type().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Load every record from the artifact at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<CanonicalRecord>, ReportError> {
    load_with_schema(path).map(|(_, records)| records)
}

/// Like [`load`], also returning the artifact's Arrow schema.
pub fn load_with_schema<P: AsRef<Path>>(
    path: P,
) -> Result<(SchemaRef, Vec<CanonicalRecord>), ReportError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ReportError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    validate_schema(&schema)?;

    let mut records = Vec::new();
    for batch in builder.build()? {
        let batch = batch?;
        debug!(rows = batch.num_rows(), "read artifact batch");
        records.extend(batch_to_records(&batch)?);
    }
    info!(path = %path.display(), rows = records.len(), "artifact loaded");
    Ok((schema, records))
}

fn column<'a, A: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<Option<&'a A>, ReportError> {
    let Some(arr) = batch.column_by_name(name) else {
        return Ok(None);
    };
    arr.as_any()
        .downcast_ref::<A>()
        .map(Some)
        .ok_or_else(|| ReportError::ColumnType {
            column: name.to_string(),
            expected: std::any::type_name::<A>().to_string(),
            found: arr.data_type().to_string(),
        })
}

fn required<'a, A: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a A, ReportError> {
    column::<A>(batch, name)?.ok_or_else(|| ReportError::SchemaViolation {
        missing: vec![name.to_string()],
    })
}

fn text(arr: &StringArray, i: usize) -> Option<String> {
    arr.is_valid(i).then(|| arr.value(i).to_string())
}

fn int(arr: &Int64Array, name: &str, i: usize) -> Result<i64, ReportError> {
    if arr.is_valid(i) {
        Ok(arr.value(i))
    } else {
        Err(ReportError::ColumnType {
            column: name.to_string(),
            expected: DataType::Int64.to_string(),
            found: "null".into(),
        })
    }
}

/// Decode one artifact batch back into records.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<CanonicalRecord>, ReportError> {
    let nama = required::<StringArray>(batch, NAMA_PENERIMA)?;
    let provinsi = required::<StringArray>(batch, PROVINSI)?;
    let usia = required::<Int64Array>(batch, USIA)?;
    let pekerjaan = required::<StringArray>(batch, JENIS_PEKERJAAN)?;
    let skor = required::<Int64Array>(batch, SKOR_KSE)?;
    let status = required::<StringArray>(batch, STATUS_KSE)?;
    let pendapatan = column::<Float64Array>(batch, PENDAPATAN)?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(CanonicalRecord {
                nama_penerima: text(nama, i).unwrap_or_default(),
                provinsi: text(provinsi, i),
                usia: int(usia, USIA, i)?,
                jenis_pekerjaan: text(pekerjaan, i),
                skor_kse: int(skor, SKOR_KSE, i)?,
                status_kse: text(status, i),
                pendapatan: pendapatan.and_then(|p| p.is_valid(i).then(|| p.value(i))),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{records_to_batch, write_parquet_atomic};
    use anyhow::Result;
    use arrow::datatypes::Field;
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(name: &str) -> CanonicalRecord {
        CanonicalRecord {
            nama_penerima: name.into(),
            provinsi: Some("Jawa Barat".into()),
            usia: 30,
            jenis_pekerjaan: None,
            skor_kse: 60,
            status_kse: Some("Layak".into()),
            pendapatan: Some(1_000.0),
        }
    }

    #[test]
    fn round_trip_preserves_types_and_values() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.parquet");
        let records = vec![record("A"), record("B")];
        write_parquet_atomic(&records_to_batch(&records)?, &path)?;
        assert_eq!(load(&path)?, records);
        Ok(())
    }

    #[test]
    fn missing_artifact_is_named() {
        let err = load("/definitely/not/here.parquet").unwrap_err();
        assert!(matches!(err, ReportError::ArtifactMissing { .. }));
        assert!(err.to_string().contains("run the pipeline"));
    }

    #[test]
    fn missing_required_columns_are_listed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("partial.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new(NAMA_PENERIMA, DataType::Utf8, false),
            Field::new(USIA, DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(Int64Array::from(vec![30])),
            ],
        )?;
        let mut writer = ArrowWriter::try_new(File::create(&path)?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        match load(&path).unwrap_err() {
            ReportError::SchemaViolation { missing } => assert_eq!(
                missing,
                vec!["provinsi", "jenis_pekerjaan", "skor_kse", "status_kse"]
            ),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn wrong_column_type_is_rejected() {
        let schema = Schema::new(vec![
            Field::new(NAMA_PENERIMA, DataType::Utf8, false),
            Field::new(PROVINSI, DataType::Utf8, true),
            Field::new(USIA, DataType::Utf8, false),
            Field::new(JENIS_PEKERJAAN, DataType::Utf8, true),
            Field::new(SKOR_KSE, DataType::Int64, false),
            Field::new(STATUS_KSE, DataType::Utf8, true),
        ]);
        match validate_schema(&schema).unwrap_err() {
            ReportError::ColumnType { column, .. } => assert_eq!(column, USIA),
            other => panic!("unexpected error: {other}"),
        }
    }
}
