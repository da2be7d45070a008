use tracing::trace;

use super::normalize::Normalizer;
use super::raw_table::RawTable;
use super::utils::{clean_str, clean_text, digits_only};
use crate::schema::{
    CanonicalRecord, DOMISILI, JENIS_PEKERJAAN, NAMA_PENERIMA, PENDAPATAN, PROVINSI, SKOR_KSE,
    STATUS_KSE, USIA,
};

/// Text → integer. Integral decimal text such as `"42.0"` is accepted;
/// empty, fractional, or non-numeric text yields `None`.
pub fn coerce_int(raw: &str) -> Option<i64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Income text → amount. Every non-digit is stripped first, so currency
/// symbols and thousands separators disappear; nothing left, or a value too
/// large to represent, means 0.
pub fn coerce_income(raw: &str) -> f64 {
    let digits = digits_only(raw);
    if digits.is_empty() {
        return 0.0;
    }
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Positions of the canonical columns in a renamed table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnIndex {
    nama_penerima: Option<usize>,
    provinsi: Option<usize>,
    usia: Option<usize>,
    jenis_pekerjaan: Option<usize>,
    skor_kse: Option<usize>,
    status_kse: Option<usize>,
    domisili: Option<usize>,
    pendapatan: Option<usize>,
}

impl ColumnIndex {
    pub fn locate(table: &RawTable) -> Self {
        Self {
            nama_penerima: table.column_index(NAMA_PENERIMA),
            provinsi: table.column_index(PROVINSI),
            usia: table.column_index(USIA),
            jenis_pekerjaan: table.column_index(JENIS_PEKERJAAN),
            skor_kse: table.column_index(SKOR_KSE),
            status_kse: table.column_index(STATUS_KSE),
            domisili: table.column_index(DOMISILI),
            pendapatan: table.column_index(PENDAPATAN),
        }
    }
}

fn field(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).map(String::as_str)
}

/// Turn one raw row into a canonical record, or `None` when the row fails
/// the admissibility gate (`usia` or `skor_kse` not coercible).
pub fn clean_row(row: &[String], cols: &ColumnIndex, norm: &Normalizer) -> Option<CanonicalRecord> {
    let usia = field(row, cols.usia).and_then(coerce_int);
    let skor_kse = field(row, cols.skor_kse).and_then(coerce_int);
    let (Some(usia), Some(skor_kse)) = (usia, skor_kse) else {
        trace!(
            usia = ?field(row, cols.usia),
            skor_kse = ?field(row, cols.skor_kse),
            "row dropped: required numeric field not coercible"
        );
        return None;
    };

    let domisili = norm.domicile(field(row, cols.domisili).and_then(clean_text).as_deref());
    let provinsi_raw = field(row, cols.provinsi).and_then(clean_text);
    let provinsi = norm.province(provinsi_raw.as_deref(), domisili.as_deref());

    Some(CanonicalRecord {
        nama_penerima: field(row, cols.nama_penerima)
            .and_then(clean_text)
            .unwrap_or_default(),
        provinsi,
        usia,
        jenis_pekerjaan: field(row, cols.jenis_pekerjaan).and_then(clean_text),
        skor_kse,
        status_kse: norm.status(field(row, cols.status_kse).and_then(clean_text)),
        pendapatan: cols
            .pendapatan
            .map(|i| row.get(i).map_or(0.0, |raw| coerce_income(raw))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_int("40"), Some(40));
        assert_eq!(coerce_int(" 40 "), Some(40));
        assert_eq!(coerce_int("40.0"), Some(40));
        assert_eq!(coerce_int("-3"), Some(-3));
        assert_eq!(coerce_int("40.5"), None);
        assert_eq!(coerce_int("abc"), None);
        assert_eq!(coerce_int(""), None);
        assert_eq!(coerce_int("NaN"), None);
        assert_eq!(coerce_int("inf"), None);
    }

    #[test]
    fn income_coercion_never_fails() {
        assert_eq!(coerce_income("Rp 1.200.000"), 1_200_000.0);
        assert_eq!(coerce_income("1,500,000"), 1_500_000.0);
        assert_eq!(coerce_income(" 900000 "), 900_000.0);
        assert_eq!(coerce_income(""), 0.0);
        assert_eq!(coerce_income("tidak ada"), 0.0);
        assert_eq!(coerce_income(&"9".repeat(400)), 0.0);
    }

    fn table() -> RawTable {
        RawTable {
            headers: ["nama_penerima", "provinsi", "usia", "skor_kse", "pendapatan"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: Vec::new(),
        }
    }

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rows_without_both_numerics_are_rejected() {
        let norm = Normalizer::new(&PipelineConfig::default()).unwrap();
        let cols = ColumnIndex::locate(&table());
        assert!(clean_row(&row(&["Budi", "Kaltim", "abc", "55", ""]), &cols, &norm).is_none());
        assert!(clean_row(&row(&["Budi", "Kaltim", "40", "", ""]), &cols, &norm).is_none());
        let rec = clean_row(&row(&["Budi", "Kaltim", "40", "55", "n/a"]), &cols, &norm).unwrap();
        assert_eq!(rec.usia, 40);
        assert_eq!(rec.skor_kse, 55);
        assert_eq!(rec.provinsi.as_deref(), Some("Kalimantan Timur"));
        assert_eq!(rec.pendapatan, Some(0.0));
        assert_eq!(rec.jenis_pekerjaan, None);
    }

    #[test]
    fn missing_income_column_leaves_income_null() {
        let norm = Normalizer::new(&PipelineConfig::default()).unwrap();
        let mut t = table();
        t.headers.pop();
        let cols = ColumnIndex::locate(&t);
        let rec = clean_row(&row(&["Budi", "Kaltim", "40", "55"]), &cols, &norm).unwrap();
        assert_eq!(rec.pendapatan, None);
    }
}
