//! Baby Names Module
//! Most common boy and girl name per province, one file per decade.

use crate::data::convert;
use crate::data::{DataLoader, LoaderError, Sex};
use crate::province::Province;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Las Palmas, Santa Cruz de Tenerife, Ceuta, Melilla.
const OFF_MAP_CODES: [&str; 4] = ["35", "38", "51", "52"];

/// Ranking selector that replaces "nameH1920"-style column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankingKey {
    pub decade: u16,
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameRow {
    pub province: Province,
    pub boys: String,
    pub girls: String,
}

impl NameRow {
    pub fn name(&self, sex: Sex) -> Option<&str> {
        match sex {
            Sex::Male => Some(&self.boys),
            Sex::Female => Some(&self.girls),
            Sex::Total => None,
        }
    }
}

/// Top names per decade plus a name → rankings index.
#[derive(Debug, Clone, PartialEq)]
pub struct NamesTable {
    decades: BTreeMap<u16, Vec<NameRow>>,
    index: BTreeMap<String, Vec<RankingKey>>,
}

/// Path of the file holding `decade`, e.g. `nombres/nombres1950.csv`.
pub fn decade_file(dir: &Path, decade: u16) -> PathBuf {
    dir.join(format!("nombres{decade}.csv"))
}

/// Trim and upper-case a user query the way the files spell names.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_uppercase()
}

/// Compact map label: leading MARIA/JOSE/FRANCISCO of compound names abbreviated.
pub fn short_label(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .map(|(i, tok)| match *tok {
            "MARIA" if i < last => "Mᵃ",
            "JOSE" if i < last => "J.",
            "FRANCISCO" if i < last => "FCO.",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl NamesTable {
    pub fn new(decades: BTreeMap<u16, Vec<NameRow>>) -> Self {
        let mut index: BTreeMap<String, Vec<RankingKey>> = BTreeMap::new();
        for (&decade, rows) in &decades {
            for row in rows {
                for sex in [Sex::Male, Sex::Female] {
                    if let Some(name) = row.name(sex) {
                        let keys = index.entry(name.to_string()).or_default();
                        let key = RankingKey { decade, sex };
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                }
            }
        }
        for keys in index.values_mut() {
            keys.sort();
        }
        Self { decades, index }
    }

    /// Load every decade file from `dir`, in parallel.
    pub fn load(dir: &Path, decades: &[u16]) -> Result<Self, LoaderError> {
        let loaded = decades
            .par_iter()
            .map(|&decade| Self::load_decade(&decade_file(dir, decade)).map(|rows| (decade, rows)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let table = Self::new(loaded);
        info!(
            decades = table.decades.len(),
            names = table.index.len(),
            "names loaded"
        );
        Ok(table)
    }

    /// Rows of one file: `prov;nameH;nameM`.
    ///
    /// Only the 48 provinces drawn on the names map are kept: abroad, the
    /// national total, the Canary Islands, Ceuta and Melilla are skipped.
    pub fn load_decade(path: &Path) -> Result<Vec<NameRow>, LoaderError> {
        let df = DataLoader::read_frame(path)?;
        let columns = DataLoader::resolve_columns(&df, path, &["prov", "nameH", "nameM"])?;
        let provs = DataLoader::text_column(&df, &columns[0])?;
        let boy_cells = DataLoader::text_column(&df, &columns[1])?;
        let girl_cells = DataLoader::text_column(&df, &columns[2])?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            if provs[i].is_some_and(is_skipped_row) {
                debug!(path = %path.display(), row = ?provs[i], "skipping non-province row");
                continue;
            }
            let province =
                DataLoader::convert_cell(path, "prov", i, provs[i], convert::upper_province_name)?;
            if !on_names_map(province) {
                continue;
            }
            let boys = DataLoader::convert_cell(path, "nameH", i, boy_cells[i], name_cell)?;
            let girls = DataLoader::convert_cell(path, "nameM", i, girl_cells[i], name_cell)?;
            rows.push(NameRow {
                province,
                boys,
                girls,
            });
        }
        Ok(rows)
    }

    pub fn decades(&self) -> impl Iterator<Item = u16> + '_ {
        self.decades.keys().copied()
    }

    pub fn rows(&self, decade: u16) -> Option<&[NameRow]> {
        self.decades.get(&decade).map(Vec::as_slice)
    }

    /// Decades and sexes in which `query` was a province's top name,
    /// oldest decade first. `None` if it never was.
    pub fn lookup(&self, query: &str) -> Option<&[RankingKey]> {
        let name = normalize_query(query);
        if name.is_empty() {
            return None;
        }
        self.index.get(&name).map(Vec::as_slice)
    }

    /// Top name per province for one decade and sex.
    pub fn ranking(&self, key: RankingKey) -> Option<BTreeMap<Province, &str>> {
        let rows = self.decades.get(&key.decade)?;
        Some(
            rows.iter()
                .filter_map(|r| r.name(key.sex).map(|n| (r.province, n)))
                .collect(),
        )
    }
}

fn on_names_map(province: Province) -> bool {
    !province.is_national() && !OFF_MAP_CODES.contains(&province.code())
}

fn is_skipped_row(raw: &str) -> bool {
    raw.trim().to_lowercase().starts_with("extranjero")
}

fn name_cell(raw: &str) -> Result<String, convert::ConvertError> {
    let s = raw.trim();
    if s.is_empty() {
        Err(convert::ConvertError::Empty)
    } else {
        Ok(s.to_uppercase())
    }
}
