//! Overview Module
//! National yearly series of population, births, deaths and marriages.

use crate::data::convert;
use crate::data::{DataLoader, LoaderError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

/// Indicators of `evolucion_poblacion.csv`, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Population,
    Births,
    Deaths,
    Marriages,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Population,
        Indicator::Births,
        Indicator::Deaths,
        Indicator::Marriages,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Indicator::Population => "Población",
            Indicator::Births => "Nacimientos",
            Indicator::Deaths => "Defunciones",
            Indicator::Marriages => "Matrimonios",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub year: i32,
    pub population: f64,
    pub births: f64,
    pub deaths: f64,
    pub marriages: f64,
}

impl OverviewRow {
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Population => self.population,
            Indicator::Births => self.births,
            Indicator::Deaths => self.deaths,
            Indicator::Marriages => self.marriages,
        }
    }

    /// Births minus deaths.
    pub fn natural_growth(&self) -> f64 {
        self.births - self.deaths
    }
}

/// Value of an indicator and its change from the previous year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorValue {
    pub value: f64,
    /// `None` for the first year of the series.
    pub change: Option<f64>,
}

/// Yearly national figures sorted by year.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewTable {
    rows: Vec<OverviewRow>,
}

impl OverviewTable {
    pub fn new(mut rows: Vec<OverviewRow>) -> Self {
        rows.sort_by_key(|r| r.year);
        Self { rows }
    }

    /// Load `evolucion_poblacion.csv`: `Periodo;Población;Nacimientos;Defunciones;Matrimonios`.
    pub fn load(path: &Path) -> Result<Self, LoaderError> {
        let df = DataLoader::read_frame(path)?;
        let mut wanted = vec!["Periodo"];
        wanted.extend(Indicator::ALL.iter().map(|i| i.column()));
        let columns = DataLoader::resolve_columns(&df, path, &wanted)?;

        let periods = DataLoader::text_column(&df, &columns[0])?;
        let series = columns[1..]
            .iter()
            .map(|c| DataLoader::text_column(&df, c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let year =
                DataLoader::convert_cell(path, "Periodo", i, periods[i], convert::period_year)?;
            let mut values = [0.0; 4];
            let by_indicator = Indicator::ALL.iter().zip(&series);
            for (slot, (indicator, cells)) in values.iter_mut().zip(by_indicator) {
                *slot = DataLoader::convert_cell(
                    path,
                    indicator.column(),
                    i,
                    cells[i],
                    convert::locale_number,
                )?;
            }
            rows.push(OverviewRow {
                year,
                population: values[0],
                births: values[1],
                deaths: values[2],
                marriages: values[3],
            });
        }

        let table = Self::new(rows);
        info!(
            rows = table.rows.len(),
            min_year = ?table.min_year(),
            max_year = ?table.max_year(),
            "overview loaded"
        );
        Ok(table)
    }

    pub fn rows(&self) -> &[OverviewRow] {
        &self.rows
    }

    pub fn min_year(&self) -> Option<i32> {
        self.rows.first().map(|r| r.year)
    }

    pub fn max_year(&self) -> Option<i32> {
        self.rows.last().map(|r| r.year)
    }

    pub fn row(&self, year: i32) -> Option<&OverviewRow> {
        self.rows
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn indicator(&self, year: i32, indicator: Indicator) -> Option<IndicatorValue> {
        let value = self.row(year)?.get(indicator);
        let change = self.row(year - 1).map(|prev| value - prev.get(indicator));
        Some(IndicatorValue { value, change })
    }

    /// Rows with `years.start() <= year <= years.end()`.
    pub fn range(&self, years: RangeInclusive<i32>) -> &[OverviewRow] {
        let start = self.rows.partition_point(|r| r.year < *years.start());
        let end = self.rows.partition_point(|r| r.year <= *years.end());
        &self.rows[start..end.max(start)]
    }

    /// (year, births − deaths) over a range.
    pub fn natural_growth(&self, years: RangeInclusive<i32>) -> Vec<(i32, f64)> {
        self.range(years)
            .iter()
            .map(|r| (r.year, r.natural_growth()))
            .collect()
    }
}
