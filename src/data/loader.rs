//! CSV Data Loader Module
//! Reads `;`-delimited INE tables with Polars and applies per-column converters.

use crate::data::convert::{self, ConvertError};
use crate::data::dataset::{AgeBand, Dataset, Family, Record, Sex};
use crate::province::Province;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("data unavailable: {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("schema mismatch in {}: missing columns {missing:?}", path.display())]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },
    #[error("invalid value in {}, column {column}, line {line}: {source}", path.display())]
    InvalidValue {
        path: PathBuf,
        column: String,
        line: usize,
        #[source]
        source: ConvertError,
    },
    #[error("code {code} on line {line} of {} does not belong to {province}", path.display())]
    CodeMismatch {
        path: PathBuf,
        line: usize,
        code: String,
        province: Province,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Column layout and converters of one source family.
///
/// `None` columns are absent from the file: a missing province column means
/// national figures, missing sex/age mean totals.
#[derive(Clone, Copy)]
pub struct TableSpec {
    pub family: Family,
    pub province: Option<(&'static str, fn(&str) -> Result<Province, ConvertError>)>,
    pub code: Option<&'static str>,
    pub period: (&'static str, fn(&str) -> Result<i32, ConvertError>),
    pub sex: Option<&'static str>,
    pub age: Option<&'static str>,
    pub value: (&'static str, fn(&str) -> Result<f64, ConvertError>),
}

impl TableSpec {
    /// `poblacion_por_provincias.csv`: `Provincias;Sexo;Edad;Periodo;Total`.
    pub const POPULATION_BY_PROVINCE: TableSpec = TableSpec {
        family: Family::PopulationByProvince,
        province: Some(("Provincias", convert::coded_province_name)),
        code: None,
        period: ("Periodo", convert::period_year),
        sex: Some("Sexo"),
        age: Some("Edad"),
        value: ("Total", convert::locale_number),
    };

    /// `poblacion_por_sexo_edad.csv`: `Sexo;Edad;Periodo;Total`.
    pub const POPULATION_BY_SEX_AGE: TableSpec = TableSpec {
        family: Family::PopulationBySexAge,
        province: None,
        code: None,
        period: ("Periodo", convert::period_year),
        sex: Some("Sexo"),
        age: Some("Edad"),
        value: ("Total", convert::locale_number),
    };

    /// `nacimientos.csv`: `Codigo;Provincias;Sexo;Periodo;Total`.
    pub const BIRTHS: TableSpec = TableSpec {
        family: Family::Births,
        province: Some(("Provincias", convert::province_name)),
        code: Some("Codigo"),
        period: ("Periodo", convert::period_year),
        sex: Some("Sexo"),
        age: None,
        value: ("Total", convert::locale_number),
    };

    /// `matrimonios.csv`: `Codigo;Provincias;Periodo;Total`.
    pub const MARRIAGES: TableSpec = TableSpec {
        family: Family::Marriages,
        province: Some(("Provincias", convert::province_name)),
        code: Some("Codigo"),
        period: ("Periodo", convert::period_year),
        sex: None,
        age: None,
        value: ("Total", convert::locale_number),
    };

    fn columns(&self) -> Vec<&'static str> {
        let mut cols = Vec::new();
        cols.extend(self.code);
        cols.extend(self.province.map(|(name, _)| name));
        cols.extend(self.sex);
        cols.extend(self.age);
        cols.push(self.period.0);
        cols.push(self.value.0);
        cols
    }
}

/// Loads INE tables into typed datasets.
pub struct DataLoader;

impl DataLoader {
    /// Read a `;`-delimited file with every column kept as text.
    ///
    /// Numbers are never inferred: locale formatting ("1.234,56") would be
    /// misread, so each family converts its columns explicitly.
    pub fn read_frame(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::DataUnavailable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        debug!(path = %path.display(), "reading csv");
        LazyCsvReader::new(path)
            .with_separator(b';')
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| LoaderError::DataUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Map each wanted column to the header actually present in `df`.
    ///
    /// Headers are compared after stripping a UTF-8 BOM and whitespace.
    pub fn resolve_columns(
        df: &DataFrame,
        path: &Path,
        wanted: &[&str],
    ) -> Result<Vec<String>, LoaderError> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut found = Vec::with_capacity(wanted.len());
        let mut missing = Vec::new();
        for want in wanted {
            match headers
                .iter()
                .find(|h| h.trim_start_matches('\u{feff}').trim() == *want)
            {
                Some(h) => found.push(h.clone()),
                None => missing.push(want.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            Err(LoaderError::SchemaMismatch {
                path: path.to_path_buf(),
                missing,
            })
        }
    }

    /// Text cells of a column, nulls included.
    pub fn text_column<'a>(
        df: &'a DataFrame,
        column: &str,
    ) -> Result<Vec<Option<&'a str>>, LoaderError> {
        let ca = df.column(column)?.str()?;
        Ok(ca.into_iter().collect())
    }

    /// Convert one cell, attaching file/column/line on failure.
    pub fn convert_cell<T>(
        path: &Path,
        column: &str,
        row: usize,
        cell: Option<&str>,
        conv: fn(&str) -> Result<T, ConvertError>,
    ) -> Result<T, LoaderError> {
        cell.ok_or(ConvertError::Empty)
            .and_then(conv)
            .map_err(|source| LoaderError::InvalidValue {
                path: path.to_path_buf(),
                column: column.to_string(),
                line: row + 2,
                source,
            })
    }

    /// Load a table into a dataset, preserving row order.
    pub fn load_table(path: &Path, spec: &TableSpec) -> Result<Dataset, LoaderError> {
        let df = Self::read_frame(path)?;
        let wanted = spec.columns();
        let actual = Self::resolve_columns(&df, path, &wanted)?;
        let column_of = |name: &'static str| header(&wanted, &actual, name);

        let provinces = spec
            .province
            .map(|(name, _)| Self::text_column(&df, column_of(name)))
            .transpose()?;
        let codes = spec
            .code
            .map(|name| Self::text_column(&df, column_of(name)))
            .transpose()?;
        let sexes = spec
            .sex
            .map(|name| Self::text_column(&df, column_of(name)))
            .transpose()?;
        let ages = spec
            .age
            .map(|name| Self::text_column(&df, column_of(name)))
            .transpose()?;
        let periods = Self::text_column(&df, column_of(spec.period.0))?;
        let values = Self::text_column(&df, column_of(spec.value.0))?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let province = match (&provinces, spec.province) {
                (Some(cells), Some((name, conv))) => {
                    Self::convert_cell(path, name, i, cells[i], conv)?
                }
                _ => Province::NATIONAL,
            };

            if let (Some(cells), Some(name)) = (&codes, spec.code) {
                let code = Self::convert_cell(path, name, i, cells[i], convert::code)?;
                if !province.is_national() && code != province.code() {
                    return Err(LoaderError::CodeMismatch {
                        path: path.to_path_buf(),
                        line: i + 2,
                        code,
                        province,
                    });
                }
            }

            let sex = match (&sexes, spec.sex) {
                (Some(cells), Some(name)) => {
                    Self::convert_cell(path, name, i, cells[i], convert::sex)?
                }
                _ => Sex::Total,
            };
            let age = match (&ages, spec.age) {
                (Some(cells), Some(name)) => {
                    Self::convert_cell(path, name, i, cells[i], convert::age_band)?
                }
                _ => AgeBand::All,
            };
            let period = Self::convert_cell(path, spec.period.0, i, periods[i], spec.period.1)?;
            let value = Self::convert_cell(path, spec.value.0, i, values[i], spec.value.1)?;

            records.push(Record {
                province,
                period,
                sex,
                age,
                value,
            });
        }

        let dataset = Dataset::new(spec.family, records);
        info!(
            family = ?spec.family,
            rows = dataset.len(),
            min_year = ?dataset.min_year(),
            max_year = ?dataset.max_year(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

fn header<'a>(wanted: &[&'static str], actual: &'a [String], name: &'static str) -> &'a str {
    wanted
        .iter()
        .position(|w| *w == name)
        .and_then(|i| actual.get(i))
        .map(String::as_str)
        .unwrap_or(name)
}
