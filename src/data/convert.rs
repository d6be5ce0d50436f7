//! Cell Converters
//! Per-column parsing of INE CSV cells (locale numbers, periods, sex, age).

use crate::data::dataset::{AgeBand, Sex};
use crate::data::normalizer;
use crate::province::Province;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("empty cell")]
    Empty,
    #[error("not a number: {0:?}")]
    Number(String),
    #[error("no year in period: {0:?}")]
    Period(String),
    #[error("unknown sex: {0:?}")]
    Sex(String),
    #[error("unknown age band: {0:?}")]
    Age(String),
    #[error("unknown province: {0:?}")]
    Province(String),
}

/// Parse a decimal-comma, thousands-dot number ("1.234,56" → 1234.56).
pub fn locale_number(raw: &str) -> Result<f64, ConvertError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ConvertError::Empty);
    }
    let cleaned: String = s.chars().filter(|c| *c != '.').collect();
    cleaned
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ConvertError::Number(raw.to_string()))
}

/// Parse a period cell; the year is the last whitespace token
/// ("1 de enero de 2021" → 2021, "2021" → 2021).
pub fn period_year(raw: &str) -> Result<i32, ConvertError> {
    raw.split_whitespace()
        .last()
        .and_then(|tok| tok.parse::<i32>().ok())
        .ok_or_else(|| ConvertError::Period(raw.to_string()))
}

pub fn sex(raw: &str) -> Result<Sex, ConvertError> {
    match raw.trim() {
        "Total" | "Ambos sexos" => Ok(Sex::Total),
        "Hombres" => Ok(Sex::Male),
        "Mujeres" => Ok(Sex::Female),
        other => Err(ConvertError::Sex(other.to_string())),
    }
}

/// "Todas las edades" / "Total" → all ages; "37 años", "100 y más" → single age.
pub fn age_band(raw: &str) -> Result<AgeBand, ConvertError> {
    let s = raw.trim();
    if s.starts_with("Todas") || s == "Total" {
        return Ok(AgeBand::All);
    }
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits
        .parse::<u16>()
        .map(AgeBand::Years)
        .map_err(|_| ConvertError::Age(raw.to_string()))
}

/// Province cell of the event families ("Coruña, A", "Total").
pub fn province_name(raw: &str) -> Result<Province, ConvertError> {
    normalizer::resolve(raw).ok_or_else(|| ConvertError::Province(raw.to_string()))
}

/// Province cell of the population-by-province family ("15 Coruña, A").
/// The leading code token is dropped only when it is a two-digit code.
pub fn coded_province_name(raw: &str) -> Result<Province, ConvertError> {
    province_name(strip_code_prefix(raw))
}

/// Upper-case province cell of the names family ("CORUÑA, A").
pub fn upper_province_name(raw: &str) -> Result<Province, ConvertError> {
    province_name(&raw.to_lowercase())
}

/// Two-digit province code cell ("08").
pub fn code(raw: &str) -> Result<String, ConvertError> {
    let s = raw.trim();
    if s.is_empty() {
        Err(ConvertError::Empty)
    } else {
        Ok(s.to_string())
    }
}

pub fn strip_code_prefix(raw: &str) -> &str {
    let s = raw.trim();
    match s.split_once(char::is_whitespace) {
        Some((code, rest)) if code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()) => {
            rest.trim_start()
        }
        _ => s,
    }
}
