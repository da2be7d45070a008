pub mod arrow;
pub mod types;
pub mod write;

pub use self::arrow::{canonical_schema, records_to_batch};
pub use types::CanonicalRecord;
pub use write::write_parquet_atomic;

pub const NAMA_PENERIMA: &str = "nama_penerima";
pub const PROVINSI: &str = "provinsi";
pub const USIA: &str = "usia";
pub const JENIS_PEKERJAAN: &str = "jenis_pekerjaan";
pub const SKOR_KSE: &str = "skor_kse";
pub const STATUS_KSE: &str = "status_kse";
pub const PENDAPATAN: &str = "pendapatan";

/// Used for the province correction only; never written to the artifact.
pub const DOMISILI: &str = "domisili";

/// The artifact's columns, in order. Nothing else is ever written.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    NAMA_PENERIMA,
    PROVINSI,
    USIA,
    JENIS_PEKERJAAN,
    SKOR_KSE,
    STATUS_KSE,
    PENDAPATAN,
];
