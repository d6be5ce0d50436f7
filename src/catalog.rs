//! Dataset Catalog
//! Memoized accessors for every family, built on first use and shared afterwards.

use crate::cache::{Cache, CacheKey};
use crate::config::{ConfigError, DataConfig};
use crate::data::{DataLoader, Dataset, LoaderError, RecordFilter, TableSpec};
use crate::geo::{Boundaries, GeoError};
use crate::names::NamesTable;
use crate::overview::OverviewTable;
use crate::stats::{MergeError, MergedTable, Merger, StatsCalculator, YearComparison};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Entry point for presenters. Safe to share across threads.
pub struct Catalog {
    config: DataConfig,
    cache: Cache,
}

impl Catalog {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            cache: Cache::new(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::new(DataConfig::from_json_file(path)?))
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn population_by_province(&self) -> Result<Arc<Dataset>, CatalogError> {
        self.cache
            .get_or_try_insert_with(CacheKey::new("population_by_province", ()), || {
                DataLoader::load_table(
                    &self.config.population_by_province_path(),
                    &TableSpec::POPULATION_BY_PROVINCE,
                )
                .map_err(CatalogError::from)
            })
    }

    pub fn population_by_sex_age(&self) -> Result<Arc<Dataset>, CatalogError> {
        self.cache
            .get_or_try_insert_with(CacheKey::new("population_by_sex_age", ()), || {
                DataLoader::load_table(
                    &self.config.population_by_sex_age_path(),
                    &TableSpec::POPULATION_BY_SEX_AGE,
                )
                .map_err(CatalogError::from)
            })
    }

    /// Births with population and per-mille rate attached.
    pub fn births(&self) -> Result<Arc<MergedTable>, CatalogError> {
        self.cache.get_or_try_insert_with(CacheKey::new("births", ()), || {
            self.merged_events(&self.config.births_path(), &TableSpec::BIRTHS)
        })
    }

    /// Marriages with population and per-mille rate attached.
    pub fn marriages(&self) -> Result<Arc<MergedTable>, CatalogError> {
        self.cache.get_or_try_insert_with(CacheKey::new("marriages", ()), || {
            self.merged_events(&self.config.marriages_path(), &TableSpec::MARRIAGES)
        })
    }

    pub fn overview(&self) -> Result<Arc<OverviewTable>, CatalogError> {
        self.cache.get_or_try_insert_with(CacheKey::new("overview", ()), || {
            OverviewTable::load(&self.config.overview_path()).map_err(CatalogError::from)
        })
    }

    pub fn names(&self) -> Result<Arc<NamesTable>, CatalogError> {
        self.cache.get_or_try_insert_with(CacheKey::new("names", ()), || {
            NamesTable::load(&self.config.names_path(), &self.config.name_decades)
                .map_err(CatalogError::from)
        })
    }

    pub fn boundaries(&self) -> Result<Arc<Boundaries>, CatalogError> {
        self.cache.get_or_try_insert_with(CacheKey::new("boundaries", ()), || {
            Boundaries::load(&self.config.boundaries_path()).map_err(CatalogError::from)
        })
    }

    /// Per-province marriage difference between two years, memoized per pair.
    pub fn marriage_comparison(
        &self,
        year1: i32,
        year2: i32,
    ) -> Result<Arc<Vec<YearComparison>>, CatalogError> {
        self.cache
            .get_or_try_insert_with(CacheKey::new("marriage_comparison", (year1, year2)), || {
                let marriages = self.marriages()?;
                Ok::<_, CatalogError>(StatsCalculator::compare_years(&marriages, year1, year2))
            })
    }

    fn merged_events(&self, path: &Path, spec: &TableSpec) -> Result<MergedTable, CatalogError> {
        let window = self.config.event_years;
        let events = DataLoader::load_table(path, spec)?
            .select(&RecordFilter::new().year_range(window.from, window.to));
        let population = self.population_by_province()?;
        Ok(Merger::merge(&events, &population)?)
    }
}
