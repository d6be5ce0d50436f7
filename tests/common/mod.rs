#![allow(dead_code)]

use demografia::{DataConfig, Province};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const POPULATION_YEARS: [i32; 4] = [1982, 2012, 2020, 2021];
pub const BIRTH_YEARS: [i32; 2] = [2020, 2021];
pub const MARRIAGE_YEARS: [i32; 2] = [1982, 2012];
pub const NAME_DECADES: [u16; 2] = [2010, 2020];

/// Spelling used by the INE event tables.
pub fn raw_name(p: Province) -> &'static str {
    match p.name() {
        "Total Nacional" => "Total",
        "Alacant/Alicante" => "Alicante/Alacant",
        "Illes Balears" => "Balears, Illes",
        "Castelló/Castellón" => "Castellón/Castelló",
        "A Coruña" => "Coruña, A",
        "La Rioja" => "Rioja, La",
        "Las Palmas" => "Palmas, Las",
        "València/Valencia" => "Valencia/València",
        other => other,
    }
}

fn number(p: Province) -> u64 {
    p.code().parse().unwrap()
}

/// "1234567" → "1.234.567"
pub fn locale(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn population(p: Province, year: i32) -> u64 {
    if p.is_national() {
        40_000_000 + (year - 1975) as u64 * 10_000
    } else {
        100_000 + number(p) * 20_000 + (year - 1975) as u64 * 500
    }
}

pub fn births(p: Province, year: i32) -> u64 {
    1_000 + number(p) * 37 + (year - 2020) as u64 * 11
}

pub fn male_births(p: Province, year: i32) -> u64 {
    births(p, year) * 51 / 100
}

pub fn marriages(p: Province, year: i32) -> u64 {
    if year == 1982 {
        2_000 + number(p) * 13
    } else {
        1_500 + number(p) * 7
    }
}

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Every source file, consistent across families.
    pub fn full() -> Self {
        let f = Self::empty();
        f.write("poblacion_por_provincias.csv", &population_csv(|_, _| true));
        f.write("poblacion_por_sexo_edad.csv", &sex_age_csv());
        f.write("nacimientos.csv", &births_csv());
        f.write("matrimonios.csv", &marriages_csv());
        f.write("evolucion_poblacion.csv", OVERVIEW_CSV);
        for decade in NAME_DECADES {
            f.write(&format!("nombres/nombres{decade}.csv"), &names_csv(decade));
        }
        f.write("provincias.geojson", &geojson());
        f
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn config(&self) -> DataConfig {
        let mut config = DataConfig::with_data_dir(self.dir.path());
        config.name_decades = NAME_DECADES.to_vec();
        config
    }
}

/// `Provincias;Sexo;Edad;Periodo;Total`, keeping the (province, year) pairs
/// accepted by `keep`.
pub fn population_csv(keep: impl Fn(Province, i32) -> bool) -> String {
    let mut csv = String::from("Provincias;Sexo;Edad;Periodo;Total\n");
    for year in POPULATION_YEARS {
        for p in Province::all().filter(|p| keep(*p, year)) {
            let name = if p.is_national() {
                "Total Nacional".to_string()
            } else {
                format!("{} {}", p.code(), raw_name(p))
            };
            let total = population(p, year);
            writeln!(
                csv,
                "{name};Total;Todas las edades;1 de enero de {year};{}",
                locale(total)
            )
            .unwrap();
            writeln!(
                csv,
                "{name};Hombres;Todas las edades;1 de enero de {year};{}",
                locale(total / 2)
            )
            .unwrap();
        }
    }
    csv
}

fn sex_age_csv() -> String {
    let mut csv = String::from("Sexo;Edad;Periodo;Total\n");
    for year in [2020, 2021] {
        let bump = (year - 2020) as u64 * 1_000;
        let rows = [
            ("Total", "Todas las edades", 47_000_000 + 2 * bump),
            ("Hombres", "Todas las edades", 23_000_000 + bump),
            ("Mujeres", "Todas las edades", 24_000_000 + bump),
            ("Hombres", "0 años", 170_000),
            ("Mujeres", "0 años", 160_000),
            ("Hombres", "9 años", 230_000),
            ("Mujeres", "45 años", 400_000),
            ("Mujeres", "100 y más años", 9_000),
        ];
        for (sex, age, total) in rows {
            writeln!(csv, "{sex};{age};1 de enero de {year};{}", locale(total)).unwrap();
        }
    }
    csv
}

fn births_csv() -> String {
    let mut csv = String::from("Codigo;Provincias;Sexo;Periodo;Total\n");
    for year in BIRTH_YEARS {
        for p in Province::all() {
            let (code, name) = (p.code(), raw_name(p));
            let total = births(p, year);
            let men = male_births(p, year);
            writeln!(csv, "{code};{name};Total;{year};{}", locale(total)).unwrap();
            writeln!(csv, "{code};{name};Hombres;{year};{}", locale(men)).unwrap();
            writeln!(csv, "{code};{name};Mujeres;{year};{}", locale(total - men)).unwrap();
        }
    }
    csv
}

fn marriages_csv() -> String {
    let mut csv = String::from("Codigo;Provincias;Periodo;Total\n");
    for year in MARRIAGE_YEARS {
        for p in Province::all() {
            // marriages spell Álava Spanish-first
            let name = match p.code() {
                "01" => "Álava/Araba",
                _ => raw_name(p),
            };
            writeln!(csv, "{};{name};{year};{}", p.code(), locale(marriages(p, year))).unwrap();
        }
    }
    csv
}

pub const OVERVIEW_CSV: &str = "\
Periodo;Población;Nacimientos;Defunciones;Matrimonios
2019;47.026.208;360.617;418.703;166.491
2020;47.450.795;341.315;493.776;90.416
2021;47.385.107;336.247;450.744;148.588
";

/// Top names for one decade; Barcelona differs from the rest.
pub fn top_names(p: Province, decade: u16) -> (&'static str, &'static str) {
    match (p.code(), decade) {
        ("08", 2010) => ("MARC", "MARIA"),
        ("08", _) => ("MARC", "JULIA"),
        (_, 2010) => ("HUGO", "LUCIA"),
        (_, _) => ("MARTIN", "LUCIA"),
    }
}

fn names_csv(decade: u16) -> String {
    let mut csv = String::from("prov;nameH;nameM\n");
    csv.push_str("TOTAL;HUGO;LUCIA\n");
    for p in Province::provinces() {
        let (boys, girls) = top_names(p, decade);
        writeln!(csv, "{};{boys};{girls}", raw_name(p).to_uppercase()).unwrap();
    }
    csv.push_str("EXTRANJERO;MOHAMED;FATIMA\n");
    csv
}

fn geojson() -> String {
    let features: Vec<serde_json::Value> = Province::provinces()
        .map(|p| {
            let (lat, lon) = p.centroid().unwrap();
            serde_json::json!({
                "type": "Feature",
                "properties": { "codigo": p.code(), "nombre": p.name() },
                "geometry": { "type": "Point", "coordinates": [lon, lat] }
            })
        })
        .collect();
    serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
}
