//! Province Module
//! Fixed code ↔ name table for the 52 Spanish provinces plus the national total.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical name of the national-total pseudo-province.
pub const NATIONAL_TOTAL: &str = "Total Nacional";

/// Code used for the national-total pseudo-province.
pub const NATIONAL_CODE: &str = "00";

struct ProvinceInfo {
    code: &'static str,
    name: &'static str,
    /// (lat, lon) used for map markers
    centroid: Option<(f64, f64)>,
}

const fn entry(code: &'static str, name: &'static str, lat: f64, lon: f64) -> ProvinceInfo {
    ProvinceInfo {
        code,
        name,
        centroid: Some((lat, lon)),
    }
}

// Index in this table is the numeric INE code.
static TABLE: [ProvinceInfo; 53] = [
    ProvinceInfo {
        code: NATIONAL_CODE,
        name: NATIONAL_TOTAL,
        centroid: None,
    },
    entry("01", "Araba/Álava", 42.8351264353, -2.72060346921),
    entry("02", "Albacete", 38.8254086192, -1.98037326935),
    entry("03", "Alacant/Alicante", 38.4786378049, -0.568699068376),
    entry("04", "Almería", 37.1960852121, -2.3448128003),
    entry("05", "Ávila", 40.5710367492, -4.94553505619),
    entry("06", "Badajoz", 38.7097707381, -6.14158521981),
    entry("07", "Illes Balears", 39.5751889864, 2.91229172079),
    entry("08", "Barcelona", 41.7310008895, 1.98405401772),
    entry("09", "Burgos", 42.3687127267, -3.58574245567),
    entry("10", "Cáceres", 39.7118899607, -6.16082194997),
    entry("11", "Cádiz", 36.5538729195, -5.7604183752),
    entry("12", "Castelló/Castellón", 40.2413705852, -0.146777086937),
    entry("13", "Ciudad Real", 38.9256128254, -3.82809764894),
    entry("14", "Córdoba", 37.9926944409, -4.80926161095),
    entry("15", "A Coruña", 43.1257958229, -8.4642836868),
    entry("16", "Cuenca", 39.8960496846, -2.19567153274),
    entry("17", "Girona", 42.1280117119, 2.6735559327),
    entry("18", "Granada", 37.3125169672, -3.26788107732),
    entry("19", "Guadalajara", 40.8134495654, -2.62368878371),
    entry("20", "Gipuzkoa", 43.1437759117, -2.19417845709),
    entry("21", "Huelva", 37.5771794021, -6.82930221031),
    entry("22", "Huesca", 42.2030557371, -0.0728865943582),
    entry("23", "Jaén", 38.0165122783, -3.44169215171),
    entry("24", "León", 42.6199552439, -5.83988102629),
    entry("25", "Lleida", 42.0439686698, 1.04798206104),
    entry("26", "La Rioja", 42.2748706958, -2.5170441194),
    entry("27", "Lugo", 43.011764, -7.44638404764),
    entry("28", "Madrid", 40.4950873744, -3.71704619215),
    entry("29", "Málaga", 36.8138591651, -4.72586195603),
    entry("30", "Murcia", 38.0023681653, -1.48575629332),
    entry("31", "Navarra", 42.6672011509, -1.64611414443),
    entry("32", "Ourense", 42.1964503002, -7.59259790937),
    entry("33", "Asturias", 43.292357861, -5.99350932547),
    entry("34", "Palencia", 42.3718338546, -4.53585717538),
    entry("35", "Las Palmas", 28.3624928216, -14.5509933924),
    entry("36", "Pontevedra", 42.435764706, -8.46106294738),
    entry("37", "Salamanca", 40.8049892162, -6.06541224773),
    entry("38", "Santa Cruz de Tenerife", 28.3125567678, -17.017856743),
    entry("39", "Cantabria", 43.1975220484, -4.03002122038),
    entry("40", "Segovia", 41.1710254065, -4.05415057783),
    entry("41", "Sevilla", 37.4356699135, -5.68277303032),
    entry("42", "Soria", 41.6207742504, -2.58874304739),
    entry("43", "Tarragona", 41.0876143957, 0.818127863314),
    entry("44", "Teruel", 40.6612619615, -0.815532258446),
    entry("45", "Toledo", 39.7937341614, -4.14815562595),
    entry("46", "València/Valencia", 39.3702562375, -0.800789615081),
    entry("47", "Valladolid", 41.6341260695, -4.84719141141),
    entry("48", "Bizkaia", 43.2376797057, -2.85260007926),
    entry("49", "Zamora", 41.7271743961, -5.98053925522),
    entry("50", "Zaragoza", 41.6203648019, -1.06449678144),
    entry("51", "Ceuta", 35.8934069863, -5.34342403891),
    entry("52", "Melilla", 35.2908279949, -2.95053552337),
];

/// Canonical province key. Code and display name both resolve to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Province(u8);

impl Province {
    /// The national-total pseudo-province.
    pub const NATIONAL: Province = Province(0);

    /// Look up by two-digit code ("01".."52", "00" for the national total).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        code.parse::<u8>()
            .ok()
            .filter(|n| (*n as usize) < TABLE.len())
            .map(Province)
    }

    /// Look up by canonical display name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        TABLE
            .iter()
            .position(|info| info.name == name)
            .map(|i| Province(i as u8))
    }

    pub fn code(self) -> &'static str {
        TABLE[self.0 as usize].code
    }

    pub fn name(self) -> &'static str {
        TABLE[self.0 as usize].name
    }

    /// Display label for compact charts: the last segment of bilingual names.
    pub fn short_name(self) -> &'static str {
        let name = self.name();
        name.rsplit('/').next().unwrap_or(name)
    }

    /// Map marker position as (lat, lon). `None` for the national total.
    pub fn centroid(self) -> Option<(f64, f64)> {
        TABLE[self.0 as usize].centroid
    }

    pub fn is_national(self) -> bool {
        self == Self::NATIONAL
    }

    /// Every key, national total first, then provinces by code.
    pub fn all() -> impl Iterator<Item = Province> {
        (0..TABLE.len() as u8).map(Province)
    }

    /// The 52 provinces, without the national total.
    pub fn provinces() -> impl Iterator<Item = Province> {
        Self::all().filter(|p| !p.is_national())
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Province {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Province::from_code(&value)
            .or_else(|| Province::from_name(&value))
            .ok_or_else(|| format!("unknown province: {value}"))
    }
}

impl From<Province> for String {
    fn from(p: Province) -> String {
        p.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn name_code_name_round_trip() {
        for p in Province::all() {
            let code = p.code();
            let back = Province::from_code(code).unwrap();
            assert_eq!(back.name(), p.name());
            assert_eq!(Province::from_name(p.name()), Some(p));
        }
    }

    #[test]
    fn mapping_is_a_bijection() {
        let codes: HashSet<_> = Province::all().map(Province::code).collect();
        let names: HashSet<_> = Province::all().map(Province::name).collect();
        assert_eq!(codes.len(), 53);
        assert_eq!(names.len(), 53);
        assert_eq!(Province::provinces().count(), 52);
    }

    #[test]
    fn codes_must_be_two_digits() {
        assert_eq!(Province::from_code("28").map(Province::name), Some("Madrid"));
        assert_eq!(Province::from_code(" 08 ").map(Province::name), Some("Barcelona"));
        assert!(Province::from_code("8").is_none());
        assert!(Province::from_code("53").is_none());
        assert!(Province::from_code("ab").is_none());
    }

    #[test]
    fn short_names_drop_the_first_bilingual_segment() {
        assert_eq!(Province::from_code("03").unwrap().short_name(), "Alicante");
        assert_eq!(Province::from_code("01").unwrap().short_name(), "Álava");
        assert_eq!(Province::from_code("28").unwrap().short_name(), "Madrid");
    }

    #[test]
    fn national_total_has_no_marker() {
        assert!(Province::NATIONAL.centroid().is_none());
        assert!(Province::from_code("35").unwrap().centroid().is_some());
    }

    #[test]
    fn serde_writes_codes_and_reads_codes_or_names() {
        let madrid = Province::from_code("28").unwrap();
        assert_eq!(serde_json::to_string(&madrid).unwrap(), r#""28""#);
        assert_eq!(serde_json::from_str::<Province>(r#""28""#).unwrap(), madrid);
        assert_eq!(serde_json::from_str::<Province>(r#""Madrid""#).unwrap(), madrid);
        assert!(serde_json::from_str::<Province>(r#""99""#).is_err());
    }
}
