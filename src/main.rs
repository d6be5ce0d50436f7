//! Demografia - command-line report
//!
//! Loads every family through the catalog and logs a summary of each.

use anyhow::{Context, Result};
use demografia::data::{Sex, Unit};
use demografia::names::RankingKey;
use demografia::overview::Indicator;
use demografia::stats::StatsCalculator;
use demografia::{Catalog, DataConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) if path.extension().is_some_and(|e| e == "json") => {
            DataConfig::from_json_file(&path)
                .with_context(|| format!("loading config {}", path.display()))?
                .apply_env()
        }
        Some(dir) => DataConfig::with_data_dir(dir),
        None => DataConfig::default().apply_env(),
    };
    info!(data_dir = %config.data_dir.display(), "startup");
    let catalog = Catalog::new(config);

    // population
    let population = catalog
        .population_by_province()
        .context("population by province")?;
    if let Some(year) = population.max_year() {
        for share in StatsCalculator::top_provinces(&population, year, 5) {
            info!(year, province = share.label, population = share.population, "top province");
        }
    }

    let by_sex_age = catalog
        .population_by_sex_age()
        .context("population by sex and age")?;
    if let Some(year) = by_sex_age.max_year() {
        if let Some((totals, change)) = StatsCalculator::sex_totals_with_change(&by_sex_age, year) {
            info!(
                year,
                total = totals.total,
                men = totals.men,
                women = totals.women,
                change = ?change.map(|c| c.total),
                "national population"
            );
        }
    }

    // births and marriages
    let births = catalog.births().context("births")?;
    let latest = births.max_year();
    if let Some(s) = StatsCalculator::rate_summary(&births, latest, Sex::Total, Unit::PerMille) {
        info!(
            year = latest,
            min = s.min,
            max = s.max,
            mean = s.mean,
            median = s.median,
            "births per mille across provinces"
        );
    }

    let marriages = catalog.marriages().context("marriages")?;
    let (first, last) = (marriages.min_year(), marriages.max_year());
    let comparison = catalog
        .marriage_comparison(first, last)
        .context("marriage comparison")?;
    let falling = comparison
        .iter()
        .filter(|c| !c.province.is_national() && c.per_mille < 0.0)
        .count();
    info!(first, last, provinces = comparison.len(), falling, "marriage rate comparison");

    // overview and names
    let overview = catalog.overview().context("overview")?;
    if let Some(year) = overview.max_year() {
        for indicator in Indicator::ALL {
            if let Some(v) = overview.indicator(year, indicator) {
                info!(
                    year,
                    indicator = indicator.column(),
                    value = v.value,
                    change = ?v.change,
                    "overview"
                );
            }
        }
    }

    let names = catalog.names().context("names")?;
    if let Some(decade) = names.decades().last() {
        for sex in [Sex::Male, Sex::Female] {
            if let Some(ranking) = names.ranking(RankingKey { decade, sex }) {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for name in ranking.values() {
                    *counts.entry(*name).or_default() += 1;
                }
                if let Some((name, provinces)) = counts.into_iter().max_by_key(|(_, n)| *n) {
                    info!(decade, sex = %sex, name, provinces, "most widespread top name");
                }
            }
        }
    }

    match catalog.boundaries() {
        Ok(boundaries) => {
            let values = StatsCalculator::map_values(&births, latest, Sex::Total, Unit::PerMille);
            let regions = boundaries
                .choropleth(&values)
                .context("joining births with boundaries")?;
            info!(regions = regions.len(), year = latest, "births map ready");
        }
        Err(e) => warn!(error = %e, "boundaries unavailable, map skipped"),
    }

    info!(
        entries = catalog.cache().len(),
        misses = catalog.cache().misses(),
        "done"
    );
    Ok(())
}
