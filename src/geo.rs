//! Province Boundaries
//! GeoJSON features keyed by `properties.codigo`, joined with per-province values.

use crate::province::Province;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("data unavailable: {}: {source}", path.display())]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feature {index} has no usable properties.codigo")]
    MissingCode { index: usize },
    #[error("unknown province code {0:?}")]
    UnknownCode(String),
    #[error("no value for region {} ({})", .0.code(), .0.name())]
    MissingRegionValue(Province),
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
    #[serde(default)]
    geometry: Value,
}

/// One province polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub province: Province,
    pub geometry: Value,
}

/// A region with the value to colour it by.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionValue<'a, V> {
    pub province: Province,
    pub value: V,
    pub geometry: &'a Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boundaries {
    regions: Vec<Region>,
}

impl Boundaries {
    pub fn load(path: &Path) -> Result<Self, GeoError> {
        let text = fs::read_to_string(path).map_err(|source| GeoError::DataUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let boundaries = Self::parse(&text)?;
        info!(path = %path.display(), regions = boundaries.regions.len(), "boundaries loaded");
        Ok(boundaries)
    }

    pub fn parse(text: &str) -> Result<Self, GeoError> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        let regions = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| {
                let code = match feature.properties.get("codigo") {
                    Some(Value::String(s)) => s.trim().to_string(),
                    Some(Value::Number(n)) => match n.as_u64() {
                        Some(n) => format!("{n:02}"),
                        None => return Err(GeoError::MissingCode { index }),
                    },
                    _ => return Err(GeoError::MissingCode { index }),
                };
                let province =
                    Province::from_code(&code).ok_or_else(|| GeoError::UnknownCode(code.clone()))?;
                Ok(Region {
                    province,
                    geometry: feature.geometry,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn provinces(&self) -> BTreeSet<Province> {
        self.regions.iter().map(|r| r.province).collect()
    }

    /// Attach a value to every region. A region without a value is an error.
    pub fn choropleth<V: Clone>(
        &self,
        values: &BTreeMap<Province, V>,
    ) -> Result<Vec<RegionValue<'_, V>>, GeoError> {
        self.regions
            .iter()
            .map(|region| {
                let value = values
                    .get(&region.province)
                    .cloned()
                    .ok_or(GeoError::MissingRegionValue(region.province))?;
                Ok(RegionValue {
                    province: region.province,
                    value,
                    geometry: &region.geometry,
                })
            })
            .collect()
    }
}
