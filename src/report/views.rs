//! The aggregate views the dashboard renders. All are pure functions over
//! loaded records; none of them touch the artifact.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::CanonicalRecord;

/// Label used when a categorical value is null.
pub const UNKNOWN: &str = "Tidak Diketahui";

/// Occupation value marking a recipient without work.
pub const UNEMPLOYED: &str = "Tidak Bekerja";

fn label(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or(UNKNOWN)
}

fn in_province(r: &CanonicalRecord, province: Option<&str>) -> bool {
    province.map_or(true, |p| r.provinsi.as_deref() == Some(p))
}

/// Sorted distinct province names, for building filters.
pub fn provinces(records: &[CanonicalRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.provinsi.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Recipient counts per (province, status), ordered by province then status.
pub fn counts_by_province_status(
    records: &[CanonicalRecord],
    province: Option<&str>,
) -> Vec<(String, String, usize)> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in records.iter().filter(|r| in_province(r, province)) {
        *counts
            .entry((label(&r.provinsi), label(&r.status_kse)))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((p, s), n)| (p.to_string(), s.to_string(), n))
        .collect()
}

/// The `n` most eligible recipients of a province, i.e. the lowest KSE
/// scores first. Ties keep artifact order.
pub fn lowest_kse<'a>(
    records: &'a [CanonicalRecord],
    province: &str,
    n: usize,
) -> Vec<&'a CanonicalRecord> {
    let mut rows: Vec<&CanonicalRecord> = records
        .iter()
        .filter(|r| in_province(r, Some(province)))
        .collect();
    rows.sort_by_key(|r| r.skor_kse);
    rows.truncate(n);
    rows
}

fn ranked(counts: BTreeMap<&str, usize>) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    // BTreeMap order breaks ties alphabetically; the sort is stable.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Recipients per occupation, largest first.
pub fn occupation_distribution(
    records: &[CanonicalRecord],
    province: Option<&str>,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records.iter().filter(|r| in_province(r, province)) {
        *counts.entry(label(&r.jenis_pekerjaan)).or_default() += 1;
    }
    ranked(counts)
}

/// Unemployed recipients aged `min_age..=max_age`, per province, largest first.
pub fn unemployed_by_province(
    records: &[CanonicalRecord],
    min_age: i64,
    max_age: i64,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records.iter().filter(|r| {
        (min_age..=max_age).contains(&r.usia) && r.jenis_pekerjaan.as_deref() == Some(UNEMPLOYED)
    }) {
        *counts.entry(label(&r.provinsi)).or_default() += 1;
    }
    ranked(counts)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceStats {
    pub province: String,
    pub recipients: usize,
    pub mean_age: f64,
    pub mean_kse: f64,
}

/// Recipient count and mean age / KSE score per province.
pub fn province_stats(records: &[CanonicalRecord]) -> Vec<ProvinceStats> {
    let mut acc: BTreeMap<&str, (usize, i64, i64)> = BTreeMap::new();
    for r in records {
        let e = acc.entry(label(&r.provinsi)).or_default();
        e.0 += 1;
        e.1 += r.usia;
        e.2 += r.skor_kse;
    }
    acc.into_iter()
        .map(|(province, (n, age, kse))| ProvinceStats {
            province: province.to_string(),
            recipients: n,
            mean_age: age as f64 / n as f64,
            mean_kse: kse as f64 / n as f64,
        })
        .collect()
}
