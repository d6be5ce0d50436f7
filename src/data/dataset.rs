//! Dataset Module
//! Typed records of one metric family and the filter predicate the presenter sends.

use crate::province::Province;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

/// Metric family a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    PopulationByProvince,
    PopulationBySexAge,
    Births,
    Marriages,
}

impl Family {
    /// Stable column name of the family's metric.
    pub fn value_column(self) -> &'static str {
        match self {
            Family::PopulationByProvince | Family::PopulationBySexAge => "Total",
            Family::Births => "Nacimientos",
            Family::Marriages => "Matrimonios",
        }
    }

    /// Stable column name of the per-mille rate.
    pub fn rate_column(self) -> &'static str {
        match self {
            Family::PopulationByProvince | Family::PopulationBySexAge => "TotalPorMil",
            Family::Births => "NacimientosPorMil",
            Family::Marriages => "MatrimoniosPorMil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Total,
    Male,
    Female,
}

impl Sex {
    /// Label used in the source files.
    pub fn label(self) -> &'static str {
        match self {
            Sex::Total => "Total",
            Sex::Male => "Hombres",
            Sex::Female => "Mujeres",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    All,
    Years(u16),
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeBand::All => f.write_str("Todas"),
            AgeBand::Years(y) => write!(f, "{y}"),
        }
    }
}

/// Absolute counts or events per 1000 inhabitants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    Absolute,
    #[default]
    PerMille,
}

/// One source row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub province: Province,
    pub period: i32,
    pub sex: Sex,
    pub age: AgeBand,
    pub value: f64,
}

impl Record {
    pub fn province_code(&self) -> &'static str {
        self.province.code()
    }

    pub fn province_name(&self) -> &'static str {
        self.province.name()
    }
}

/// Year component of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearSelection {
    Single(i32),
    Range(RangeInclusive<i32>),
    /// Comparison pages pick two years.
    Pair(i32, i32),
}

impl YearSelection {
    pub fn contains(&self, year: i32) -> bool {
        match self {
            YearSelection::Single(y) => *y == year,
            YearSelection::Range(r) => r.contains(&year),
            YearSelection::Pair(a, b) => year == *a || year == *b,
        }
    }
}

/// Filter predicate over canonical keys. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub years: Option<YearSelection>,
    pub sex: Option<Sex>,
    pub province: Option<Province>,
    pub age: Option<AgeBand>,
    pub exclude_national: bool,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(mut self, year: i32) -> Self {
        self.years = Some(YearSelection::Single(year));
        self
    }

    pub fn year_range(mut self, from: i32, to: i32) -> Self {
        self.years = Some(YearSelection::Range(from..=to));
        self
    }

    pub fn year_pair(mut self, a: i32, b: i32) -> Self {
        self.years = Some(YearSelection::Pair(a, b));
        self
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn province(mut self, province: Province) -> Self {
        self.province = Some(province);
        self
    }

    pub fn age(mut self, age: AgeBand) -> Self {
        self.age = Some(age);
        self
    }

    /// Drop the national-total rows (map views).
    pub fn without_national(mut self) -> Self {
        self.exclude_national = true;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.years.as_ref().is_none_or(|y| y.contains(record.period))
            && self.sex.is_none_or(|s| s == record.sex)
            && self.province.is_none_or(|p| p == record.province)
            && self.age.is_none_or(|a| a == record.age)
            && !(self.exclude_national && record.province.is_national())
    }
}

/// Ordered records of one family plus the year span present.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    family: Family,
    records: Vec<Record>,
    year_span: Option<(i32, i32)>,
}

impl Dataset {
    pub fn new(family: Family, records: Vec<Record>) -> Self {
        let year_span = records.iter().fold(None, |span, r| match span {
            None => Some((r.period, r.period)),
            Some((lo, hi)) => Some((lo.min(r.period), hi.max(r.period))),
        });
        Self {
            family,
            records,
            year_span,
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min_year(&self) -> Option<i32> {
        self.year_span.map(|(lo, _)| lo)
    }

    pub fn max_year(&self) -> Option<i32> {
        self.year_span.map(|(_, hi)| hi)
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().map(|r| r.period).collect()
    }

    pub fn provinces(&self) -> BTreeSet<Province> {
        self.records.iter().map(|r| r.province).collect()
    }

    /// Rows matching `filter`, in source order.
    pub fn filter(&self, filter: RecordFilter) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    /// New dataset holding only the matching rows.
    pub fn select(&self, filter: &RecordFilter) -> Dataset {
        Dataset::new(self.family, self.filter(filter.clone()).cloned().collect())
    }
}
