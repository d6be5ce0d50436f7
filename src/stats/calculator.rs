//! Statistics Calculator Module
//! Derived figures shown on the population, births and marriages pages.

use crate::data::{AgeBand, Dataset, RecordFilter, Sex, Unit};
use crate::province::Province;
use crate::stats::merge::{MergedRow, MergedTable};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Width of a pyramid band in years; the last band is open (">= 100").
pub const PYRAMID_BAND_YEARS: u16 = 10;

/// Number of pyramid bands: 0-9 … 90-99 plus ">= 100".
pub const PYRAMID_BANDS: usize = 11;

/// One province's slice of the national population.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceShare {
    pub province: Province,
    pub label: &'static str,
    pub population: f64,
}

/// One ten-year band of the population pyramid.
#[derive(Debug, Clone, PartialEq)]
pub struct PyramidBand {
    pub label: String,
    pub men: f64,
    pub women: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SexTotals {
    pub total: f64,
    pub men: f64,
    pub women: f64,
}

impl SexTotals {
    pub fn minus(&self, other: &SexTotals) -> SexTotals {
        SexTotals {
            total: self.total - other.total,
            men: self.men - other.men,
            women: self.women - other.women,
        }
    }
}

/// Per-province result of comparing two years.
///
/// With two distinct years `count` and `per_mille` are signed differences
/// (later minus earlier selection) and `population` is the mean of both years.
#[derive(Debug, Clone, PartialEq)]
pub struct YearComparison {
    pub province: Province,
    pub count: f64,
    pub per_mille: f64,
    pub population: f64,
}

impl YearComparison {
    pub fn value(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Absolute => self.count,
            Unit::PerMille => self.per_mille,
        }
    }
}

/// Spread of a value across provinces, for colour scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Handles the page-level calculations over loaded datasets.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Largest provinces by population for `year`, national total excluded.
    /// Populations are rounded to whole people.
    pub fn top_provinces(population: &Dataset, year: i32, n: usize) -> Vec<ProvinceShare> {
        let filter = RecordFilter::new()
            .year(year)
            .sex(Sex::Total)
            .age(AgeBand::All)
            .without_national();

        let mut shares: Vec<ProvinceShare> = population
            .filter(filter)
            .map(|r| ProvinceShare {
                province: r.province,
                label: r.province.short_name(),
                population: r.value.round(),
            })
            .collect();
        shares.sort_by(|a, b| {
            b.population
                .partial_cmp(&a.population)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        shares.truncate(n);
        shares
    }

    /// Label of the pyramid band an age falls into.
    pub fn band_label(index: usize) -> String {
        let lo = index as u16 * PYRAMID_BAND_YEARS;
        if index + 1 >= PYRAMID_BANDS {
            format!(">= {lo}")
        } else {
            format!("{}-{}", lo, lo + PYRAMID_BAND_YEARS - 1)
        }
    }

    /// Men and women per ten-year age band for `year`, youngest first.
    pub fn pyramid(by_sex_age: &Dataset, year: i32) -> Vec<PyramidBand> {
        let mut bands: Vec<PyramidBand> = (0..PYRAMID_BANDS)
            .map(|i| PyramidBand {
                label: Self::band_label(i),
                men: 0.0,
                women: 0.0,
            })
            .collect();

        let filter = RecordFilter::new().year(year);
        for r in by_sex_age.filter(filter) {
            let AgeBand::Years(age) = r.age else {
                continue;
            };
            let index = ((age / PYRAMID_BAND_YEARS) as usize).min(PYRAMID_BANDS - 1);
            match r.sex {
                Sex::Male => bands[index].men += r.value,
                Sex::Female => bands[index].women += r.value,
                Sex::Total => {}
            }
        }
        bands
    }

    /// National total, men and women for `year` (all-ages rows).
    pub fn sex_totals(by_sex_age: &Dataset, year: i32) -> Option<SexTotals> {
        let filter = RecordFilter::new().year(year).age(AgeBand::All);
        let mut totals = SexTotals::default();
        let mut seen = [false; 3];
        for r in by_sex_age.filter(filter) {
            match r.sex {
                Sex::Total => {
                    totals.total = r.value;
                    seen[0] = true;
                }
                Sex::Male => {
                    totals.men = r.value;
                    seen[1] = true;
                }
                Sex::Female => {
                    totals.women = r.value;
                    seen[2] = true;
                }
            }
        }
        seen.iter().all(|s| *s).then_some(totals)
    }

    /// Totals for `year` and the change from the previous year, when present.
    pub fn sex_totals_with_change(
        by_sex_age: &Dataset,
        year: i32,
    ) -> Option<(SexTotals, Option<SexTotals>)> {
        let current = Self::sex_totals(by_sex_age, year)?;
        let change = Self::sex_totals(by_sex_age, year - 1).map(|prev| current.minus(&prev));
        Some((current, change))
    }

    /// Yearly (men, women) all-ages totals, oldest year first.
    pub fn sex_series(by_sex_age: &Dataset) -> BTreeMap<i32, (f64, f64)> {
        let filter = RecordFilter::new().age(AgeBand::All);
        let mut series: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
        for r in by_sex_age.filter(filter) {
            let entry = series.entry(r.period).or_default();
            match r.sex {
                Sex::Male => entry.0 = r.value,
                Sex::Female => entry.1 = r.value,
                Sex::Total => {}
            }
        }
        series
    }

    /// Compare two years per province (all-sexes rows), ordered by code.
    ///
    /// When the years differ the result is `year2 - year1`; when they are
    /// equal it is the plain figure for that year.
    pub fn compare_years(table: &MergedTable, year1: i32, year2: i32) -> Vec<YearComparison> {
        let pick = |year: i32| {
            let filter = RecordFilter::new().year(year).sex(Sex::Total);
            table
                .filter(filter)
                .map(|r| (r.record.province, r))
                .collect::<BTreeMap<Province, &MergedRow>>()
        };

        let first = pick(year1);
        if year1 == year2 {
            return first
                .into_iter()
                .map(|(province, r)| YearComparison {
                    province,
                    count: r.record.value,
                    per_mille: r.per_mille,
                    population: r.population,
                })
                .collect();
        }

        let second = pick(year2);
        first
            .into_iter()
            .filter_map(|(province, a)| {
                let b = second.get(&province)?;
                Some(YearComparison {
                    province,
                    count: b.record.value - a.record.value,
                    per_mille: b.per_mille - a.per_mille,
                    population: Statistics::mean([a.population, b.population]),
                })
            })
            .collect()
    }

    /// Per-province values for a map, national total excluded.
    pub fn map_values(
        table: &MergedTable,
        year: i32,
        sex: Sex,
        unit: Unit,
    ) -> BTreeMap<Province, f64> {
        let filter = RecordFilter::new().year(year).sex(sex).without_national();
        table
            .filter(filter)
            .map(|r| (r.record.province, r.value(unit)))
            .collect()
    }

    /// Spread of per-province values for one year and sex, national total excluded.
    pub fn rate_summary(
        table: &MergedTable,
        year: i32,
        sex: Sex,
        unit: Unit,
    ) -> Option<RateSummary> {
        let filter = RecordFilter::new().year(year).sex(sex).without_national();
        let mut values: Vec<f64> = table.filter(filter).map(|r| r.value(unit)).collect();
        if values.is_empty() {
            return None;
        }

        let min = Statistics::min(&values);
        let max = Statistics::max(&values);
        let mean = Statistics::mean(&values);
        let std_dev = if values.len() > 1 {
            Statistics::std_dev(&values)
        } else {
            0.0
        };

        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let n = values.len();
        let median = if n % 2 == 0 {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        } else {
            values[n / 2]
        };

        Some(RateSummary {
            count: n,
            min,
            max,
            mean,
            median,
            std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Family, Record};
    use crate::stats::merge::Merger;

    fn prov(code: &str) -> Province {
        Province::from_code(code).unwrap()
    }

    fn rec(p: Province, period: i32, sex: Sex, age: AgeBand, value: f64) -> Record {
        Record {
            province: p,
            period,
            sex,
            age,
            value,
        }
    }

    #[test]
    fn band_labels() {
        assert_eq!(StatsCalculator::band_label(0), "0-9");
        assert_eq!(StatsCalculator::band_label(9), "90-99");
        assert_eq!(StatsCalculator::band_label(10), ">= 100");
    }

    #[test]
    fn pyramid_groups_single_ages_into_decades() {
        let n = Province::NATIONAL;
        let ds = Dataset::new(
            Family::PopulationBySexAge,
            vec![
                rec(n, 2020, Sex::Male, AgeBand::All, 999.0),
                rec(n, 2020, Sex::Male, AgeBand::Years(0), 10.0),
                rec(n, 2020, Sex::Male, AgeBand::Years(9), 5.0),
                rec(n, 2020, Sex::Female, AgeBand::Years(10), 7.0),
                rec(n, 2020, Sex::Female, AgeBand::Years(104), 2.0),
                rec(n, 2020, Sex::Total, AgeBand::Years(0), 15.0),
                rec(n, 2019, Sex::Male, AgeBand::Years(0), 100.0),
            ],
        );
        let bands = StatsCalculator::pyramid(&ds, 2020);
        assert_eq!(bands.len(), PYRAMID_BANDS);
        assert_eq!((bands[0].men, bands[0].women), (15.0, 0.0));
        assert_eq!((bands[1].men, bands[1].women), (0.0, 7.0));
        assert_eq!(bands[10].women, 2.0);
    }

    #[test]
    fn sex_totals_need_all_three_rows() {
        let n = Province::NATIONAL;
        let ds = Dataset::new(
            Family::PopulationBySexAge,
            vec![
                rec(n, 2020, Sex::Total, AgeBand::All, 100.0),
                rec(n, 2020, Sex::Male, AgeBand::All, 48.0),
                rec(n, 2020, Sex::Female, AgeBand::All, 52.0),
                rec(n, 2021, Sex::Total, AgeBand::All, 110.0),
                rec(n, 2021, Sex::Male, AgeBand::All, 53.0),
                rec(n, 2021, Sex::Female, AgeBand::All, 57.0),
                rec(n, 2022, Sex::Total, AgeBand::All, 1.0),
            ],
        );
        let (now, change) = StatsCalculator::sex_totals_with_change(&ds, 2021).unwrap();
        assert_eq!(now.total, 110.0);
        assert_eq!(
            change,
            Some(SexTotals {
                total: 10.0,
                men: 5.0,
                women: 5.0
            })
        );
        let (_, first) = StatsCalculator::sex_totals_with_change(&ds, 2020).unwrap();
        assert!(first.is_none());
        assert!(StatsCalculator::sex_totals(&ds, 2022).is_none());
        assert_eq!(StatsCalculator::sex_series(&ds)[&2020], (48.0, 52.0));
    }

    #[test]
    fn top_provinces_skip_the_national_total() {
        let ds = Dataset::new(
            Family::PopulationByProvince,
            vec![
                rec(Province::NATIONAL, 2020, Sex::Total, AgeBand::All, 1000.0),
                rec(prov("28"), 2020, Sex::Total, AgeBand::All, 300.4),
                rec(prov("08"), 2020, Sex::Total, AgeBand::All, 250.0),
                rec(prov("03"), 2020, Sex::Total, AgeBand::All, 100.0),
                rec(prov("46"), 2019, Sex::Total, AgeBand::All, 900.0),
            ],
        );
        let top = StatsCalculator::top_provinces(&ds, 2020, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "Madrid");
        assert_eq!(top[0].population, 300.0);
        assert_eq!(top[1].label, "Barcelona");

        let all = StatsCalculator::top_provinces(&ds, 2020, 10);
        assert_eq!(all.last().map(|s| s.label), Some("Alicante"));
    }

    fn marriages() -> MergedTable {
        let rows = [
            (prov("28"), 1982, 20_000.0, 4_000_000.0),
            (prov("28"), 2012, 15_000.0, 6_000_000.0),
            (prov("08"), 1982, 18_000.0, 4_500_000.0),
            (prov("08"), 2012, 12_000.0, 5_500_000.0),
        ];
        let events = Dataset::new(
            Family::Marriages,
            rows.iter()
                .map(|(p, y, v, _)| rec(*p, *y, Sex::Total, AgeBand::All, *v))
                .collect(),
        );
        let pop = Dataset::new(
            Family::PopulationByProvince,
            rows.iter()
                .map(|(p, y, _, pop)| rec(*p, *y, Sex::Total, AgeBand::All, *pop))
                .collect(),
        );
        Merger::merge(&events, &pop).unwrap()
    }

    #[test]
    fn comparison_is_later_minus_earlier() {
        let table = marriages();
        let diff = StatsCalculator::compare_years(&table, 1982, 2012);
        assert_eq!(diff.len(), 2);
        // ordered by code: Barcelona (08) before Madrid (28)
        assert_eq!(diff[0].province, prov("08"));
        assert_eq!(diff[0].count, -6_000.0);
        assert_eq!(diff[1].count, 15_000.0 - 20_000.0);
        assert_eq!(diff[1].population, 5_000_000.0);
        assert_eq!(diff[1].per_mille, 2.5 - 5.0);
    }

    #[test]
    fn comparison_of_a_year_with_itself_is_the_literal_count() {
        let table = marriages();
        let same = StatsCalculator::compare_years(&table, 2012, 2012);
        assert_eq!(same[1].province, prov("28"));
        assert_eq!(same[1].count, 15_000.0);
        assert_eq!(same[1].value(Unit::PerMille), 2.5);
    }

    #[test]
    fn rate_summary_over_provinces() {
        let table = marriages();
        let s = StatsCalculator::rate_summary(&table, 1982, Sex::Total, Unit::PerMille).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.min, 4.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.mean, 4.5);
        assert_eq!(s.median, 4.5);
        assert!(StatsCalculator::rate_summary(&table, 1990, Sex::Total, Unit::PerMille).is_none());
    }

    #[test]
    fn map_values_skip_the_national_total() {
        let table = marriages();
        let values = StatsCalculator::map_values(&table, 2012, Sex::Total, Unit::Absolute);
        assert_eq!(values.len(), 2);
        assert_eq!(values[&prov("08")], 12_000.0);
    }
}
