//! Demografia - Spanish demographic statistics
//!
//! Loads INE population, births, marriages and names tables, repairs province
//! names to one canonical form, and joins event counts with population.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod data;
pub mod geo;
pub mod names;
pub mod overview;
pub mod province;
pub mod stats;

pub use catalog::{Catalog, CatalogError};
pub use config::DataConfig;
pub use province::Province;
