//! Data Processor Module
//! Flattens typed tables into polars frames with stable column names.

use crate::data::{Dataset, Family, Record, RecordFilter, YearSelection};
use crate::province::NATIONAL_CODE;
use crate::stats::{MergedTable, YearComparison};
use polars::prelude::*;
use thiserror::Error;

pub const CODE_COLUMN: &str = "Codigo";
pub const PROVINCE_COLUMN: &str = "Provincias";
pub const PERIOD_COLUMN: &str = "Periodo";
pub const SEX_COLUMN: &str = "Sexo";
pub const AGE_COLUMN: &str = "Edad";
pub const POPULATION_COLUMN: &str = "Poblacion";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Key columns shared by every frame, built from a row iterator.
struct KeyColumns {
    codes: Vec<&'static str>,
    names: Vec<&'static str>,
    periods: Vec<i32>,
    sexes: Vec<&'static str>,
    ages: Vec<String>,
    values: Vec<f64>,
}

impl KeyColumns {
    fn with_capacity(n: usize) -> Self {
        Self {
            codes: Vec::with_capacity(n),
            names: Vec::with_capacity(n),
            periods: Vec::with_capacity(n),
            sexes: Vec::with_capacity(n),
            ages: Vec::with_capacity(n),
            values: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, r: &Record) {
        self.codes.push(r.province_code());
        self.names.push(r.province_name());
        self.periods.push(r.period);
        self.sexes.push(r.sex.label());
        self.ages.push(r.age.to_string());
        self.values.push(r.value);
    }

    fn into_columns(self, family: Family) -> Vec<Column> {
        vec![
            Column::new(CODE_COLUMN.into(), self.codes),
            Column::new(PROVINCE_COLUMN.into(), self.names),
            Column::new(PERIOD_COLUMN.into(), self.periods),
            Column::new(SEX_COLUMN.into(), self.sexes),
            Column::new(AGE_COLUMN.into(), self.ages),
            Column::new(family.value_column().into(), self.values),
        ]
    }
}

/// Converts loaded tables to frames and filters them lazily.
pub struct DataProcessor;

impl DataProcessor {
    /// `Codigo, Provincias, Periodo, Sexo, Edad, <value>` in record order.
    pub fn dataset_frame(dataset: &Dataset) -> Result<DataFrame, ProcessorError> {
        let mut keys = KeyColumns::with_capacity(dataset.len());
        for r in dataset.records() {
            keys.push(r);
        }
        Ok(DataFrame::new(keys.into_columns(dataset.family()))?)
    }

    /// Dataset columns plus `Poblacion` and the family's per-mille column.
    pub fn merged_frame(table: &MergedTable) -> Result<DataFrame, ProcessorError> {
        let mut keys = KeyColumns::with_capacity(table.len());
        let mut population = Vec::with_capacity(table.len());
        let mut rates = Vec::with_capacity(table.len());
        for row in table.rows() {
            keys.push(&row.record);
            population.push(row.population);
            rates.push(row.per_mille);
        }

        let family = table.family();
        let mut columns = keys.into_columns(family);
        columns.push(Column::new(POPULATION_COLUMN.into(), population));
        columns.push(Column::new(family.rate_column().into(), rates));
        Ok(DataFrame::new(columns)?)
    }

    /// `Codigo, Provincias, <value>, <rate>, Poblacion` for a two-year comparison.
    pub fn comparison_frame(
        family: Family,
        rows: &[YearComparison],
    ) -> Result<DataFrame, ProcessorError> {
        let df = DataFrame::new(vec![
            Column::new(
                CODE_COLUMN.into(),
                rows.iter().map(|r| r.province.code()).collect::<Vec<_>>(),
            ),
            Column::new(
                PROVINCE_COLUMN.into(),
                rows.iter().map(|r| r.province.name()).collect::<Vec<_>>(),
            ),
            Column::new(
                family.value_column().into(),
                rows.iter().map(|r| r.count).collect::<Vec<_>>(),
            ),
            Column::new(
                family.rate_column().into(),
                rows.iter().map(|r| r.per_mille).collect::<Vec<_>>(),
            ),
            Column::new(
                POPULATION_COLUMN.into(),
                rows.iter().map(|r| r.population).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(df)
    }

    /// Polars expression equivalent of [`RecordFilter::matches`].
    pub fn filter_expr(filter: &RecordFilter) -> Expr {
        let mut expr = lit(true);
        if let Some(years) = &filter.years {
            let period = col(PERIOD_COLUMN);
            let by_year = match years {
                YearSelection::Single(y) => period.eq(lit(*y)),
                YearSelection::Range(r) => period
                    .clone()
                    .gt_eq(lit(*r.start()))
                    .and(period.lt_eq(lit(*r.end()))),
                YearSelection::Pair(a, b) => period.clone().eq(lit(*a)).or(period.eq(lit(*b))),
            };
            expr = expr.and(by_year);
        }
        if let Some(sex) = filter.sex {
            expr = expr.and(col(SEX_COLUMN).eq(lit(sex.label())));
        }
        if let Some(province) = filter.province {
            expr = expr.and(col(CODE_COLUMN).eq(lit(province.code())));
        }
        if let Some(age) = filter.age {
            expr = expr.and(col(AGE_COLUMN).eq(lit(age.to_string())));
        }
        if filter.exclude_national {
            expr = expr.and(col(CODE_COLUMN).neq(lit(NATIONAL_CODE)));
        }
        expr
    }

    /// Filter a frame produced by this module.
    pub fn filter_frame(
        df: &DataFrame,
        filter: &RecordFilter,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(Self::filter_expr(filter))
            .collect()?;
        Ok(filtered)
    }

    /// Distinct province codes of a frame, sorted.
    pub fn codes(df: &DataFrame) -> Result<Vec<String>, ProcessorError> {
        let ca = df.column(CODE_COLUMN)?.str()?;
        let mut codes: Vec<String> = ca.into_iter().flatten().map(str::to_string).collect();
        codes.sort();
        codes.dedup();
        Ok(codes)
    }
}
