//! Data module - INE CSV loading, province name repair and frame conversion

pub mod convert;
mod dataset;
mod loader;
pub mod normalizer;
mod processor;

pub use dataset::{AgeBand, Dataset, Family, Record, RecordFilter, Sex, Unit, YearSelection};
pub use loader::{DataLoader, LoaderError, TableSpec};
pub use processor::{DataProcessor, ProcessorError};
