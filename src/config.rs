//! Configuration Module
//! Where the source files live and which years and decades to read.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`DataConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "DEMOGRAFIA_DATA_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty year window {from}..={to}")]
    EmptyYearWindow { from: i32, to: i32 },
}

/// Inclusive range of years the event families are restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub from: i32,
    pub to: i32,
}

impl YearWindow {
    pub fn range(&self) -> RangeInclusive<i32> {
        self.from..=self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub population_by_province: String,
    pub population_by_sex_age: String,
    pub births: String,
    pub marriages: String,
    pub overview: String,
    pub names_dir: String,
    pub boundaries: String,
    pub name_decades: Vec<u16>,
    /// Years with births, marriages and population all available.
    pub event_years: YearWindow,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            population_by_province: "poblacion_por_provincias.csv".to_string(),
            population_by_sex_age: "poblacion_por_sexo_edad.csv".to_string(),
            births: "nacimientos.csv".to_string(),
            marriages: "matrimonios.csv".to_string(),
            overview: "evolucion_poblacion.csv".to_string(),
            names_dir: "nombres".to_string(),
            boundaries: "provincias.geojson".to_string(),
            name_decades: (1920..=2020).step_by(10).collect(),
            event_years: YearWindow {
                from: 1975,
                to: 2021,
            },
        }
    }
}

impl DataConfig {
    /// Defaults rooted at `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DEMOGRAFIA_DATA_DIR` when it is set and non-empty.
    pub fn apply_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let YearWindow { from, to } = self.event_years;
        if from > to {
            return Err(ConfigError::EmptyYearWindow { from, to });
        }
        Ok(())
    }

    pub fn population_by_province_path(&self) -> PathBuf {
        self.data_dir.join(&self.population_by_province)
    }

    pub fn population_by_sex_age_path(&self) -> PathBuf {
        self.data_dir.join(&self.population_by_sex_age)
    }

    pub fn births_path(&self) -> PathBuf {
        self.data_dir.join(&self.births)
    }

    pub fn marriages_path(&self) -> PathBuf {
        self.data_dir.join(&self.marriages)
    }

    pub fn overview_path(&self) -> PathBuf {
        self.data_dir.join(&self.overview)
    }

    pub fn names_path(&self) -> PathBuf {
        self.data_dir.join(&self.names_dir)
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.data_dir.join(&self.boundaries)
    }
}
