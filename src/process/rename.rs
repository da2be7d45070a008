//! Raw header vocabulary → canonical column names.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::raw_table::RawTable;
use super::utils::header_key;
use crate::error::{PipelineError, Result};

/// Case- and separator-insensitive lookup from raw header spellings to
/// canonical names. Every canonical name also resolves to itself.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    lookup: HashMap<String, String>,
}

impl HeaderMap {
    pub fn new(aliases: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut lookup: HashMap<String, String> = HashMap::new();
        for (canonical, raws) in aliases {
            let spellings = std::iter::once(canonical).chain(raws);
            for raw in spellings {
                let key = header_key(raw);
                match lookup.get(&key) {
                    Some(existing) if existing != canonical => {
                        return Err(PipelineError::Config(format!(
                            "header spelling `{}` maps to both `{}` and `{}`",
                            raw, existing, canonical
                        )));
                    }
                    _ => {
                        lookup.insert(key, canonical.clone());
                    }
                }
            }
        }
        Ok(Self { lookup })
    }

    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.lookup.get(&header_key(raw)).map(String::as_str)
    }
}

/// Rename `table.headers` in place. Unmapped columns keep their (trimmed) raw
/// name. When two raw columns resolve to the same canonical name the first
/// one wins and the later one keeps its raw name.
///
/// Returns the canonical names that were assigned.
pub fn canonicalize_headers(table: &mut RawTable, map: &HeaderMap) -> Vec<String> {
    let mut assigned: HashSet<String> = HashSet::new();
    let mut renamed = Vec::new();

    for header in table.headers.iter_mut() {
        let Some(canonical) = map.resolve(header) else {
            debug!(column = %header, "unmapped column passes through");
            continue;
        };
        if !assigned.insert(canonical.to_string()) {
            warn!(
                column = %header,
                canonical,
                "duplicate column for canonical name; keeping the first"
            );
            continue;
        }
        if header.as_str() != canonical {
            debug!(from = %header, to = canonical, "renamed column");
        }
        *header = canonical.to_string();
        renamed.push(canonical.to_string());
    }

    info!(columns = ?renamed, "canonical columns resolved");
    renamed
}

/// Fail with the exact list of required columns that are absent.
pub fn check_required(table: &RawTable, required: &[String]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn table(headers: &[&str]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn real_extract_headers_are_renamed() {
        let map = HeaderMap::new(&PipelineConfig::default().header_aliases).unwrap();
        let mut t = table(&[
            "NAMA KK", "PROVINSI", "USIA", "PEKERJAAN", "KSE", "KATEGORI", "DOMISILI", "NIK",
        ]);
        canonicalize_headers(&mut t, &map);
        assert_eq!(
            t.headers,
            vec![
                "nama_penerima",
                "provinsi",
                "usia",
                "jenis_pekerjaan",
                "skor_kse",
                "status_kse",
                "domisili",
                "NIK"
            ]
        );
    }

    #[test]
    fn mock_data_headers_are_renamed() {
        let map = HeaderMap::new(&PipelineConfig::default().header_aliases).unwrap();
        let mut t = table(&[
            "Nama_Penerima",
            "Usia",
            "Provinsi",
            "Jenis_Pekerjaan",
            "Status_KSE",
            "Skor_KSE",
        ]);
        canonicalize_headers(&mut t, &map);
        assert_eq!(
            t.headers,
            vec![
                "nama_penerima",
                "usia",
                "provinsi",
                "jenis_pekerjaan",
                "status_kse",
                "skor_kse"
            ]
        );
    }

    #[test]
    fn duplicate_canonical_keeps_first() {
        let map = HeaderMap::new(&PipelineConfig::default().header_aliases).unwrap();
        let mut t = table(&["USIA", "UMUR"]);
        canonicalize_headers(&mut t, &map);
        assert_eq!(t.headers, vec!["usia", "UMUR"]);
    }

    #[test]
    fn missing_required_columns_are_named() {
        let map = HeaderMap::new(&PipelineConfig::default().header_aliases).unwrap();
        let mut t = table(&["NAMA KK", "UMUR"]);
        canonicalize_headers(&mut t, &map);
        let err = check_required(&t, &["usia".into(), "skor_kse".into()]).unwrap_err();
        match err {
            PipelineError::SchemaMismatch { missing } => assert_eq!(missing, vec!["skor_kse"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn conflicting_alias_is_a_config_error() {
        let mut aliases = BTreeMap::new();
        aliases.insert("usia".to_string(), vec!["UMUR".to_string()]);
        aliases.insert("skor_kse".to_string(), vec!["umur".to_string()]);
        assert!(matches!(
            HeaderMap::new(&aliases).unwrap_err(),
            PipelineError::Config(_)
        ));
    }
}
