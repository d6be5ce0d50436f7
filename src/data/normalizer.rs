//! Province Name Normalizer
//! Canonicalizes INE province spellings so every family joins on the same key.
//!
//! Rules, in order:
//! 1. "City, Region" → "Region City"
//! 2. "NameA/NameB" → "NameB/NameA"
//! 3. fixed substitutions (Basque-first Álava, "Total" → "Total Nacional")
//!
//! A name that is already canonical is returned as is.

use crate::province::{Province, NATIONAL_TOTAL};
use tracing::{debug, warn};

const SUBSTITUTIONS: [(&str, &str); 2] =
    [("álava/araba", "Araba/Álava"), ("total", NATIONAL_TOTAL)];

/// Canonical display form of a raw province name.
///
/// Unrecognized formats pass through the rules unchanged; use [`resolve`]
/// when the result must be a known province.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(p) = Province::from_name(trimmed) {
        return p.name().to_string();
    }

    let inverted = invert_comma(trimmed);
    let swapped = swap_bilingual(&inverted);
    substitute(swapped)
}

/// Normalize and map to the province table.
///
/// Falls back to case- and accent-insensitive matching, which covers the
/// upper-case names family ("AVILA", "SANTA CRUZ DE TENERIFE").
pub fn resolve(raw: &str) -> Option<Province> {
    let canonical = normalize(raw);
    if let Some(p) = Province::from_name(&canonical) {
        return Some(p);
    }

    let folded = fold(&canonical);
    let found = Province::all().find(|p| fold(p.name()) == folded);
    match found {
        Some(p) => debug!(raw, canonical = p.name(), "province matched loosely"),
        None => warn!(raw, normalized = %canonical, "unrecognized province name"),
    }
    found
}

fn invert_comma(s: &str) -> String {
    if s.contains(", ") {
        s.rsplit(", ").map(str::trim).collect::<Vec<_>>().join(" ")
    } else {
        s.to_string()
    }
}

fn swap_bilingual(s: &str) -> String {
    if s.contains('/') {
        s.split('/').map(str::trim).rev().collect::<Vec<_>>().join("/")
    } else {
        s.to_string()
    }
}

fn substitute(s: String) -> String {
    let lower = s.to_lowercase();
    SUBSTITUTIONS
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| to.to_string())
        .unwrap_or(s)
}

/// Lower-case and strip Spanish/Catalan diacritics.
fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' => 'a',
            'é' | 'è' => 'e',
            'í' | 'ï' => 'i',
            'ó' | 'ò' => 'o',
            'ú' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
