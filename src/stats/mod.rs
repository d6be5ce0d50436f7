//! Statistics module - population merge and page-level figures

mod calculator;
mod merge;

pub use calculator::{
    ProvinceShare, PyramidBand, RateSummary, SexTotals, StatsCalculator, YearComparison,
    PYRAMID_BANDS, PYRAMID_BAND_YEARS,
};
pub use merge::{KeyDimension, MergeError, MergedRow, MergedTable, Merger};
