//! Declarative pipeline configuration.
//!
//! Everything that changes between registry revisions (delimiter, encodings,
//! header spellings, alias tables) lives here rather than in the transform.
//! Every field has a built-in default, so an empty YAML document is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::process::decode::Encoding;
use crate::schema::{DOMISILI, PROVINSI, SKOR_KSE, USIA};

/// Only configuration documents of this version are accepted.
pub const CONFIG_VERSION: u32 = 1;

/// One ordered substitution rule: every case-insensitive occurrence of
/// `alias` is replaced by `canonical`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub alias: String,
    pub canonical: String,
}

/// Cities whose presence in `domisili` pins the row to `province`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomicileProvince {
    pub province: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub version: u32,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Field delimiter of the source extract. Never auto-detected.
    pub delimiter: String,
    /// Decodings attempted in order.
    pub encodings: Vec<Encoding>,
    pub required_columns: Vec<String>,
    /// canonical name → raw header spellings
    pub header_aliases: BTreeMap<String, Vec<String>>,
    pub provinces: Vec<String>,
    pub province_aliases: Vec<AliasRule>,
    pub domicile_aliases: Vec<AliasRule>,
    pub domicile_provinces: Vec<DomicileProvince>,
    /// raw eligibility label → canonical label
    pub status_labels: BTreeMap<String, String>,
}

impl PipelineConfig {
    /// Read and validate a YAML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("reading {}: {}", path.display(), e))
        })?;
        let cfg = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), "loaded pipeline configuration");
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: PipelineConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural checks that do not depend on the alias tables' contents.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(PipelineError::Config(format!(
                "unsupported config version {} (expected {})",
                self.version, CONFIG_VERSION
            )));
        }
        self.delimiter_byte()?;
        if self.encodings.is_empty() {
            return Err(PipelineError::Config(
                "at least one encoding must be configured".into(),
            ));
        }
        let missing: Vec<&str> = [USIA, SKOR_KSE]
            .into_iter()
            .filter(|name| !self.required_columns.iter().any(|c| c == name))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Config(format!(
                "required_columns must include {}",
                missing.join(", ")
            )));
        }
        for rule in self.province_aliases.iter().chain(&self.domicile_aliases) {
            if rule.alias.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "empty alias for `{}`",
                    rule.canonical
                )));
            }
        }
        Ok(())
    }

    /// The delimiter as the single byte the CSV reader wants.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(PipelineError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

fn aliases(pairs: &[(&str, &str)]) -> Vec<AliasRule> {
    pairs
        .iter()
        .map(|(alias, canonical)| AliasRule {
            alias: alias.to_string(),
            canonical: canonical.to_string(),
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let header_aliases = [
            (
                "nama_penerima",
                &["NAMA KK", "NAMA KEPALA KELUARGA", "NAMA PENERIMA", "NAMA"][..],
            ),
            (PROVINSI, &["PROVINSI", "PROPINSI", "PROV"][..]),
            (USIA, &["UMUR", "USIA KK"][..]),
            ("jenis_pekerjaan", &["PEKERJAAN", "PEKERJAAN KK"][..]),
            (SKOR_KSE, &["KSE", "SKOR", "NILAI KSE"][..]),
            ("status_kse", &["KATEGORI", "STATUS", "KETERANGAN"][..]),
            (DOMISILI, &["KAB/KOTA", "KABUPATEN/KOTA", "KOTA"][..]),
            ("pendapatan", &["PENGHASILAN", "PENDAPATAN PER BULAN"][..]),
        ]
        .into_iter()
        .map(|(canonical, raw)| (canonical.to_string(), strings(raw)))
        .collect();

        let provinces = strings(&[
            "Aceh",
            "Sumatera Utara",
            "Sumatera Barat",
            "Riau",
            "Jambi",
            "Sumatera Selatan",
            "Bengkulu",
            "Lampung",
            "Kepulauan Bangka Belitung",
            "Kepulauan Riau",
            "DKI Jakarta",
            "Jawa Barat",
            "Jawa Tengah",
            "DI Yogyakarta",
            "Jawa Timur",
            "Banten",
            "Bali",
            "Nusa Tenggara Barat",
            "Nusa Tenggara Timur",
            "Kalimantan Barat",
            "Kalimantan Tengah",
            "Kalimantan Selatan",
            "Kalimantan Timur",
            "Kalimantan Utara",
            "Sulawesi Utara",
            "Sulawesi Tengah",
            "Sulawesi Selatan",
            "Sulawesi Tenggara",
            "Gorontalo",
            "Sulawesi Barat",
            "Maluku",
            "Maluku Utara",
            "Papua",
            "Papua Barat",
        ]);

        let province_aliases = aliases(&[
            ("Kalimantan Tmr", "Kalimantan Timur"),
            ("Kaltim", "Kalimantan Timur"),
            ("Kaltara", "Kalimantan Utara"),
            ("Kalbar", "Kalimantan Barat"),
            ("Kalsel", "Kalimantan Selatan"),
            ("Kalteng", "Kalimantan Tengah"),
            ("Jabar", "Jawa Barat"),
            ("Jateng", "Jawa Tengah"),
            ("Jatim", "Jawa Timur"),
            ("Sumut", "Sumatera Utara"),
            ("Sumbar", "Sumatera Barat"),
            ("Sumsel", "Sumatera Selatan"),
            ("Sulsel", "Sulawesi Selatan"),
            ("Sulut", "Sulawesi Utara"),
            ("Sulteng", "Sulawesi Tengah"),
            ("Sultra", "Sulawesi Tenggara"),
            ("Sulbar", "Sulawesi Barat"),
            ("Jogja", "DI Yogyakarta"),
            ("DIY", "DI Yogyakarta"),
            ("NTB", "Nusa Tenggara Barat"),
            ("NTT", "Nusa Tenggara Timur"),
            ("Babel", "Kepulauan Bangka Belitung"),
            ("Kepri", "Kepulauan Riau"),
        ]);

        // More specific spellings first: "Bppn" must win over "Bpp".
        let domicile_aliases = aliases(&[
            ("Blkppn", "Balikpapan"),
            ("Bppn", "Balikpapan"),
            ("Bpp", "Balikpapan"),
            ("Smd", "Samarinda"),
            ("Smr", "Samarinda"),
            ("Btg", "Bontang"),
            ("Kukar", "Kutai Kartanegara"),
            ("Kutim", "Kutai Timur"),
            ("Kubar", "Kutai Barat"),
            ("PPU", "Penajam Paser Utara"),
        ]);

        let domicile_provinces = vec![DomicileProvince {
            province: "Kalimantan Timur".into(),
            cities: strings(&[
                "Balikpapan",
                "Samarinda",
                "Bontang",
                "Kutai Kartanegara",
                "Kutai Timur",
                "Kutai Barat",
                "Berau",
                "Paser",
                "Penajam Paser Utara",
                "Mahakam Ulu",
            ]),
        }];

        let status_labels = [
            ("menerima bansos", "Layak"),
            ("tidak menerima bansos", "Tidak Layak"),
            ("sangat layak", "Sangat Layak"),
            ("layak", "Layak"),
            ("tidak layak", "Tidak Layak"),
            ("dipertimbangkan", "Dipertimbangkan"),
        ]
        .into_iter()
        .map(|(raw, label)| (raw.to_string(), label.to_string()))
        .collect();

        Self {
            version: CONFIG_VERSION,
            input_path: PathBuf::from("Data_cleaning_sipa.csv"),
            output_path: PathBuf::from("processed_data/bansos_data_cleaned.parquet"),
            delimiter: ";".into(),
            encodings: vec![Encoding::Utf8, Encoding::Latin1],
            required_columns: strings(&[USIA, SKOR_KSE]),
            header_aliases,
            provinces,
            province_aliases,
            domicile_aliases,
            domicile_provinces,
            status_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.delimiter_byte().unwrap(), b';');
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let cfg = PipelineConfig::from_yaml_str(
            "delimiter: \",\"\nencodings: [utf-8]\ninput_path: sample.csv\n",
        )
        .unwrap();
        assert_eq!(cfg.delimiter_byte().unwrap(), b',');
        assert_eq!(cfg.encodings, vec![Encoding::Utf8]);
        assert_eq!(cfg.input_path, PathBuf::from("sample.csv"));
        assert_eq!(cfg.status_labels, PipelineConfig::default().status_labels);
    }

    #[test]
    fn rejects_multi_char_delimiter() {
        let err = PipelineConfig::from_yaml_str("delimiter: \";;\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn required_columns_cannot_drop_the_numeric_minimum() {
        for doc in [
            "required_columns: []",
            "required_columns: [usia]",
            "required_columns: [skor_kse, nama_penerima]",
        ] {
            let err = PipelineConfig::from_yaml_str(doc).unwrap_err();
            assert!(matches!(err, PipelineError::Config(_)), "{doc}");
        }
        let cfg =
            PipelineConfig::from_yaml_str("required_columns: [nama_penerima, usia, skor_kse]")
                .unwrap();
        assert_eq!(cfg.required_columns.len(), 3);
    }

    #[test]
    fn rejects_unknown_version_and_unknown_fields() {
        assert!(matches!(
            PipelineConfig::from_yaml_str("version: 2").unwrap_err(),
            PipelineError::Config(_)
        ));
        assert!(matches!(
            PipelineConfig::from_yaml_str("delimeter: \";\"").unwrap_err(),
            PipelineError::Yaml(_)
        ));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let text = include_str!("../config/pipeline.yaml");
        let cfg = PipelineConfig::from_yaml_str(text).unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }
}
