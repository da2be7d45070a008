// src/schema/types.rs

/// One cleaned recipient row, exactly as it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub nama_penerima: String,
    pub provinsi: Option<String>,
    pub usia: i64,
    pub jenis_pekerjaan: Option<String>,
    /// Lower means more eligible.
    pub skor_kse: i64,
    pub status_kse: Option<String>,
    /// `None` only when the source has no income column at all.
    pub pendapatan: Option<f64>,
}
