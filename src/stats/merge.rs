//! Population Merge Module
//! Joins event counts with population on (province, year) and derives per-mille rates.

use crate::data::{AgeBand, Dataset, Family, Record, RecordFilter, Sex, Unit};
use crate::province::Province;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::info;

/// Which key dimension failed to line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDimension {
    Province,
    Year,
    ProvinceYear,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MergeError {
    #[error(
        "join keys differ ({dimension:?}): only in population {only_in_population:?}, \
         only in events {only_in_events:?}"
    )]
    JoinKeyMismatch {
        dimension: KeyDimension,
        only_in_population: Vec<String>,
        only_in_events: Vec<String>,
    },
    #[error("event dataset is empty")]
    EmptyEvents,
}

/// A record with the population of its (province, year) and the derived rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub record: Record,
    pub population: f64,
    /// Events per 1000 inhabitants.
    pub per_mille: f64,
}

impl MergedRow {
    pub fn value(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Absolute => self.record.value,
            Unit::PerMille => self.per_mille,
        }
    }
}

/// Merged event table; rows keep the event dataset's order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    family: Family,
    rows: Vec<MergedRow>,
    year_span: (i32, i32),
}

impl MergedTable {
    pub fn family(&self) -> Family {
        self.family
    }

    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn min_year(&self) -> i32 {
        self.year_span.0
    }

    pub fn max_year(&self) -> i32 {
        self.year_span.1
    }

    /// Canonical provinces present, national total included.
    pub fn provinces(&self) -> BTreeSet<Province> {
        self.rows.iter().map(|r| r.record.province).collect()
    }

    pub fn filter(&self, filter: RecordFilter) -> impl Iterator<Item = &MergedRow> + '_ {
        self.rows.iter().filter(move |r| filter.matches(&r.record))
    }

    /// The single row for (province, year, sex), if any.
    pub fn get(&self, province: Province, year: i32, sex: Sex) -> Option<&MergedRow> {
        self.rows.iter().find(|r| {
            r.record.province == province && r.record.period == year && r.record.sex == sex
        })
    }

    /// Rows of one province across every year, oldest first, for evolution charts.
    pub fn province_series(&self, province: Province, sex: Sex) -> Vec<&MergedRow> {
        let mut series: Vec<&MergedRow> = self
            .rows
            .iter()
            .filter(|r| r.record.province == province && r.record.sex == sex)
            .collect();
        series.sort_by_key(|r| r.record.period);
        series
    }

    /// (men, women) for one province and year in the requested unit.
    pub fn sex_breakdown(&self, province: Province, year: i32, unit: Unit) -> Option<(f64, f64)> {
        let men = self.get(province, year, Sex::Male)?.value(unit);
        let women = self.get(province, year, Sex::Female)?.value(unit);
        Some((men, women))
    }
}

/// Merges event families with population figures.
pub struct Merger;

impl Merger {
    /// Events per 1000 inhabitants. Population is positive in this domain.
    pub fn per_mille(events: f64, population: f64) -> f64 {
        events / population * 1000.0
    }

    /// Join `events` with `population` on (province, year).
    ///
    /// Population rows are restricted to the events' year span and to the
    /// all-sexes, all-ages figures. Province sets, year sets and
    /// (province, year) pairs must then match exactly.
    pub fn merge(events: &Dataset, population: &Dataset) -> Result<MergedTable, MergeError> {
        let (lo, hi) = match (events.min_year(), events.max_year()) {
            (Some(lo), Some(hi)) => (lo, hi),
            _ => return Err(MergeError::EmptyEvents),
        };

        let totals = RecordFilter::new()
            .year_range(lo, hi)
            .sex(Sex::Total)
            .age(AgeBand::All);
        let lookup: HashMap<(Province, i32), f64> = population
            .filter(totals)
            .map(|r| ((r.province, r.period), r.value))
            .collect();

        Self::check_keys(events, &lookup)?;

        let rows = events
            .records()
            .iter()
            .filter_map(|r| {
                let population = *lookup.get(&(r.province, r.period))?;
                Some(MergedRow {
                    record: r.clone(),
                    population,
                    per_mille: Self::per_mille(r.value, population),
                })
            })
            .collect::<Vec<_>>();

        info!(
            family = ?events.family(),
            rows = rows.len(),
            min_year = lo,
            max_year = hi,
            "merged with population"
        );

        Ok(MergedTable {
            family: events.family(),
            rows,
            year_span: (lo, hi),
        })
    }

    fn check_keys(
        events: &Dataset,
        population: &HashMap<(Province, i32), f64>,
    ) -> Result<(), MergeError> {
        let pop_provinces: BTreeSet<Province> = population.keys().map(|(p, _)| *p).collect();
        compare(KeyDimension::Province, &pop_provinces, &events.provinces(), |p| {
            p.name().to_string()
        })?;

        let pop_years: BTreeSet<i32> = population.keys().map(|(_, y)| *y).collect();
        compare(KeyDimension::Year, &pop_years, &events.years(), |y| y.to_string())?;

        let pop_pairs: BTreeSet<(Province, i32)> = population.keys().copied().collect();
        let event_pairs: BTreeSet<(Province, i32)> = events
            .records()
            .iter()
            .map(|r| (r.province, r.period))
            .collect();
        compare(KeyDimension::ProvinceYear, &pop_pairs, &event_pairs, |(p, y)| {
            format!("{} {}", p.name(), y)
        })
    }
}

fn compare<K: Ord>(
    dimension: KeyDimension,
    population: &BTreeSet<K>,
    events: &BTreeSet<K>,
    label: impl Fn(&K) -> String,
) -> Result<(), MergeError> {
    if population == events {
        return Ok(());
    }
    Err(MergeError::JoinKeyMismatch {
        dimension,
        only_in_population: population.difference(events).map(&label).collect(),
        only_in_events: events.difference(population).map(&label).collect(),
    })
}
