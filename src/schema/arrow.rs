// src/schema/arrow.rs

use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::types::CanonicalRecord;
use super::{JENIS_PEKERJAAN, NAMA_PENERIMA, PENDAPATAN, PROVINSI, SKOR_KSE, STATUS_KSE, USIA};

/// Arrow schema of the artifact. `usia` and `skor_kse` are non-nullable
/// integers; the admissibility gate guarantees every row has both.
pub fn canonical_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(NAMA_PENERIMA, DataType::Utf8, false),
        Field::new(PROVINSI, DataType::Utf8, true),
        Field::new(USIA, DataType::Int64, false),
        Field::new(JENIS_PEKERJAAN, DataType::Utf8, true),
        Field::new(SKOR_KSE, DataType::Int64, false),
        Field::new(STATUS_KSE, DataType::Utf8, true),
        Field::new(PENDAPATAN, DataType::Float64, true),
    ]))
}

/// Column-wise build of a single batch holding every record.
pub fn records_to_batch(records: &[CanonicalRecord]) -> Result<RecordBatch, ArrowError> {
    let nama: StringArray = records
        .iter()
        .map(|r| Some(r.nama_penerima.as_str()))
        .collect();
    let provinsi: StringArray = records.iter().map(|r| r.provinsi.as_deref()).collect();
    let usia = Int64Array::from_iter_values(records.iter().map(|r| r.usia));
    let pekerjaan: StringArray = records
        .iter()
        .map(|r| r.jenis_pekerjaan.as_deref())
        .collect();
    let skor = Int64Array::from_iter_values(records.iter().map(|r| r.skor_kse));
    let status: StringArray = records.iter().map(|r| r.status_kse.as_deref()).collect();
    let pendapatan: Float64Array = records.iter().map(|r| r.pendapatan).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(nama),
        Arc::new(provinsi),
        Arc::new(usia),
        Arc::new(pekerjaan),
        Arc::new(skor),
        Arc::new(status),
        Arc::new(pendapatan),
    ];
    RecordBatch::try_new(canonical_schema(), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CANONICAL_COLUMNS;

    #[test]
    fn batch_columns_are_exactly_the_canonical_set() {
        let records = vec![CanonicalRecord {
            nama_penerima: "Budi".into(),
            provinsi: None,
            usia: 40,
            jenis_pekerjaan: Some("Petani".into()),
            skor_kse: 55,
            status_kse: Some("Layak".into()),
            pendapatan: None,
        }];
        let batch = records_to_batch(&records).unwrap();
        let names: Vec<&str> = batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, CANONICAL_COLUMNS.to_vec());
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.column(1).null_count(), 1);
        assert_eq!(batch.column(6).null_count(), 1);
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = records_to_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), CANONICAL_COLUMNS.len());
    }
}
