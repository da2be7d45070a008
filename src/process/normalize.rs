//! Categorical value folding: domicile and province aliases, the
//! domicile-driven province correction, and eligibility relabelling.

use regex::{NoExpand, Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::debug;

use crate::config::{AliasRule, PipelineConfig};
use crate::error::{PipelineError, Result};

/// Ordered, case-insensitive substring substitutions.
#[derive(Debug, Clone)]
struct AliasChain {
    rules: Vec<(Regex, String)>,
}

impl AliasChain {
    fn compile(rules: &[AliasRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let re = RegexBuilder::new(&regex::escape(rule.alias.trim()))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        PipelineError::Config(format!("alias `{}`: {}", rule.alias, e))
                    })?;
                Ok((re, rule.canonical.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    fn fold(&self, value: &str) -> String {
        let mut out = value.to_string();
        for (re, canonical) in &self.rules {
            if re.is_match(&out) {
                out = re.replace_all(&out, NoExpand(canonical)).into_owned();
            }
        }
        out
    }

    /// Every alias must land exactly on its canonical form and every
    /// canonical form must be a fixed point; otherwise a later rule is
    /// clobbering an earlier one.
    fn verify(&self, table: &str, rules: &[AliasRule]) -> Result<()> {
        for rule in rules {
            for input in [rule.alias.trim(), rule.canonical.as_str()] {
                let folded = self.fold(input);
                if folded != rule.canonical {
                    return Err(PipelineError::Config(format!(
                        "{} alias table: `{}` folds to `{}` instead of `{}`; \
                         put more specific aliases first",
                        table, input, folded, rule.canonical
                    )));
                }
            }
        }
        Ok(())
    }

    /// Vocabulary entries must survive folding unchanged.
    fn verify_fixed_points<'a>(
        &self,
        table: &str,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<()> {
        for name in names {
            let folded = self.fold(name);
            if &folded != name {
                return Err(PipelineError::Config(format!(
                    "{} vocabulary entry `{}` is rewritten to `{}` by the alias table",
                    table, name, folded
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    provinces: AliasChain,
    domiciles: AliasChain,
    /// lowercase → canonical spelling
    province_vocab: HashMap<String, String>,
    /// lowercase city → province it pins
    city_province: HashMap<String, String>,
    /// lowercase raw label → canonical label
    status_labels: HashMap<String, String>,
}

impl Normalizer {
    pub fn new(cfg: &PipelineConfig) -> Result<Self> {
        let provinces = AliasChain::compile(&cfg.province_aliases)?;
        provinces.verify("province", &cfg.province_aliases)?;
        provinces.verify_fixed_points(
            "province",
            cfg.provinces
                .iter()
                .chain(cfg.domicile_provinces.iter().map(|d| &d.province)),
        )?;
        let domiciles = AliasChain::compile(&cfg.domicile_aliases)?;
        domiciles.verify("domicile", &cfg.domicile_aliases)?;

        let mut province_vocab = HashMap::new();
        let vocab = cfg
            .provinces
            .iter()
            .chain(cfg.province_aliases.iter().map(|r| &r.canonical))
            .chain(cfg.domicile_provinces.iter().map(|d| &d.province));
        for name in vocab {
            province_vocab
                .entry(name.to_lowercase())
                .or_insert_with(|| name.clone());
        }

        let mut city_province: HashMap<String, String> = HashMap::new();
        for group in &cfg.domicile_provinces {
            for city in &group.cities {
                let key = city.trim().to_lowercase();
                if let Some(prev) = city_province.get(&key) {
                    if prev != &group.province {
                        return Err(PipelineError::Config(format!(
                            "city `{}` is assigned to both `{}` and `{}`",
                            city, prev, group.province
                        )));
                    }
                }
                city_province.insert(key, group.province.clone());
            }
        }

        let status_labels = cfg
            .status_labels
            .iter()
            .map(|(raw, label)| (raw.trim().to_lowercase(), label.clone()))
            .collect();

        Ok(Self {
            provinces,
            domiciles,
            province_vocab,
            city_province,
            status_labels,
        })
    }

    /// Fold known misspellings of a city of residence.
    pub fn domicile(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|v| self.domiciles.fold(v))
    }

    /// Canonical province for a row. A domicile in the override table wins
    /// over whatever province the source states.
    pub fn province(&self, raw: Option<&str>, domicile: Option<&str>) -> Option<String> {
        if let Some(pinned) = domicile.and_then(|d| self.city_province.get(&d.to_lowercase())) {
            if raw != Some(pinned.as_str()) {
                debug!(
                    stated = ?raw,
                    domicile = ?domicile,
                    province = %pinned,
                    "province overridden by domicile"
                );
            }
            return Some(pinned.clone());
        }
        raw.map(|v| {
            let folded = self.provinces.fold(v);
            self.province_vocab
                .get(&folded.to_lowercase())
                .cloned()
                .unwrap_or(folded)
        })
    }

    /// Relabel eligibility; unknown labels pass through unchanged.
    pub fn status(&self, raw: Option<String>) -> Option<String> {
        raw.map(|v| match self.status_labels.get(&v.to_lowercase()) {
            Some(label) => label.clone(),
            None => v,
        })
    }
}
