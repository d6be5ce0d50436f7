mod common;

use common::Fixture;
use demografia::data::convert::ConvertError;
use demografia::data::{AgeBand, DataLoader, Family, LoaderError, Sex, TableSpec};
use demografia::names::NamesTable;
use demografia::overview::OverviewTable;
use demografia::Province;
use std::collections::BTreeMap;

#[test]
fn missing_file_is_data_unavailable() {
    let fixture = Fixture::empty();
    let path = fixture.path().join("nacimientos.csv");
    match DataLoader::load_table(&path, &TableSpec::BIRTHS) {
        Err(LoaderError::DataUnavailable { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
}

#[test]
fn missing_columns_are_listed() {
    let fixture = Fixture::empty();
    fixture.write("matrimonios.csv", "Codigo;Provincias;Total\n28;Madrid;10\n");
    let path = fixture.path().join("matrimonios.csv");
    match DataLoader::load_table(&path, &TableSpec::MARRIAGES) {
        Err(LoaderError::SchemaMismatch { missing, .. }) => {
            assert_eq!(missing, vec!["Periodo".to_string()])
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn bad_cells_name_column_and_line() {
    let fixture = Fixture::empty();
    fixture.write(
        "matrimonios.csv",
        "Codigo;Provincias;Periodo;Total\n28;Madrid;2020;1.000\n08;Barcelona;2020;mil\n",
    );
    let path = fixture.path().join("matrimonios.csv");
    match DataLoader::load_table(&path, &TableSpec::MARRIAGES) {
        Err(LoaderError::InvalidValue {
            column,
            line,
            source,
            ..
        }) => {
            assert_eq!(column, "Total");
            assert_eq!(line, 3);
            assert_eq!(source, ConvertError::Number("mil".to_string()));
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn unknown_province_names_fail_loudly() {
    let fixture = Fixture::empty();
    fixture.write(
        "matrimonios.csv",
        "Codigo;Provincias;Periodo;Total\n28;Madrid;2020;1\n99;Atlantida;2020;1\n",
    );
    let path = fixture.path().join("matrimonios.csv");
    let err = DataLoader::load_table(&path, &TableSpec::MARRIAGES).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::InvalidValue { line: 3, source: ConvertError::Province(_), .. }
    ));
}

#[test]
fn code_must_match_the_province() {
    let fixture = Fixture::empty();
    fixture.write(
        "nacimientos.csv",
        "Codigo;Provincias;Sexo;Periodo;Total\n00;Total;Total;2020;5\n08;Madrid;Total;2020;1\n",
    );
    let path = fixture.path().join("nacimientos.csv");
    match DataLoader::load_table(&path, &TableSpec::BIRTHS) {
        Err(LoaderError::CodeMismatch { line, code, province, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(code, "08");
            assert_eq!(province.name(), "Madrid");
        }
        other => panic!("expected CodeMismatch, got {other:?}"),
    }
}

#[test]
fn population_rows_are_typed() {
    let fixture = Fixture::empty();
    fixture.write(
        "poblacion_por_provincias.csv",
        "\u{feff}Provincias;Sexo;Edad;Periodo;Total\n\
         Total Nacional;Total;Todas las edades;1 de enero de 2021;47.385.107\n\
         15 Coruña, A;Mujeres;Todas las edades;1 de enero de 2021;581.034\n\
         07 Balears, Illes;Hombres;37 años;1 de enero de 2020;9.876\n",
    );
    let path = fixture.path().join("poblacion_por_provincias.csv");
    let ds = DataLoader::load_table(&path, &TableSpec::POPULATION_BY_PROVINCE).unwrap();

    assert_eq!(ds.family(), Family::PopulationByProvince);
    assert_eq!(ds.len(), 3);
    assert_eq!((ds.min_year(), ds.max_year()), (Some(2020), Some(2021)));

    let rows = ds.records();
    assert!(rows[0].province.is_national());
    assert_eq!(rows[0].value, 47_385_107.0);
    assert_eq!(rows[1].province_name(), "A Coruña");
    assert_eq!(rows[1].sex, Sex::Female);
    assert_eq!(rows[2].province, Province::from_code("07").unwrap());
    assert_eq!(rows[2].age, AgeBand::Years(37));
}

#[test]
fn national_sex_age_table_has_no_province_column() {
    let fixture = Fixture::empty();
    fixture.write(
        "poblacion_por_sexo_edad.csv",
        "Sexo;Edad;Periodo;Total\nAmbos sexos;Todas las edades;1 de enero de 2022;47.475.420\n",
    );
    let path = fixture.path().join("poblacion_por_sexo_edad.csv");
    let ds = DataLoader::load_table(&path, &TableSpec::POPULATION_BY_SEX_AGE).unwrap();
    let r = &ds.records()[0];
    assert_eq!(
        (r.province, r.sex, r.age, r.period),
        (Province::NATIONAL, Sex::Total, AgeBand::All, 2022)
    );
}

#[test]
fn names_decade_file_skips_non_provinces() {
    let fixture = Fixture::empty();
    fixture.write(
        "nombres/nombres1950.csv",
        "prov;nameH;nameM\n\
         TOTAL;JOSE;MARIA CARMEN\n\
         ÁLAVA/ARABA;JOSE;MARIA\n\
         SANTA CRUZ DE TENERIFE;JOSE;CANDELARIA\n\
         PALMAS, LAS;ACHAMAN;ACERINA\n\
         MADRID;JOSE;MARIA CARMEN\n\
         CEUTA;MOHAMED;FATIMA\n\
         Extranjero;JOHN;MARY\n",
    );
    let rows = NamesTable::load_decade(&fixture.path().join("nombres/nombres1950.csv")).unwrap();
    let codes: Vec<&str> = rows.iter().map(|r| r.province.code()).collect();
    assert_eq!(codes, vec!["01", "28"]);
    assert_eq!(rows[1].girls, "MARIA CARMEN");

    let table = NamesTable::new(BTreeMap::from([(1950, rows)]));
    assert!(table.lookup("acerina").is_none());
    assert!(table.lookup("candelaria").is_none());
}

#[test]
fn missing_decade_file_fails_the_names_family() {
    let fixture = Fixture::empty();
    fixture.write("nombres/nombres1920.csv", "prov;nameH;nameM\nMADRID;JOSE;MARIA\n");
    let err = NamesTable::load(&fixture.path().join("nombres"), &[1920, 1930]).unwrap_err();
    assert!(matches!(err, LoaderError::DataUnavailable { .. }));
}

#[test]
fn overview_years_are_parsed_from_periods() {
    let fixture = Fixture::empty();
    fixture.write("evolucion_poblacion.csv", common::OVERVIEW_CSV);
    let table = OverviewTable::load(&fixture.path().join("evolucion_poblacion.csv")).unwrap();
    assert_eq!(table.rows().len(), 3);
    assert_eq!(table.row(2019).unwrap().population, 47_026_208.0);
}
