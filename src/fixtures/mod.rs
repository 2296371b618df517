//! Fixtures
//!
//! YAML files describing a pricing table and a product catalog, loaded from a base
//! directory laid out as `rules/<name>.yml` and `catalog/<name>.yml`.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    fixtures::catalog::CatalogFixture,
    pricing::rules::{PricingRules, PricingRulesError},
    products::Catalog,
};

pub mod catalog;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Size group without a price
    #[error("Garment type {garment_type} has no price for size group {size_group}")]
    MissingSizeGroup {
        /// Garment type key
        garment_type: String,
        /// Size group label
        size_group: &'static str,
    },

    /// The parsed table is inconsistent
    #[error("Invalid pricing rules: {0}")]
    Rules(#[from] PricingRulesError),
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixture {
    /// Create a fixture loader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a pricing table from `rules/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the table is invalid.
    pub fn load_rules(&self, name: &str) -> Result<PricingRules, FixtureError> {
        let file_path = self.base_path.join("rules").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        rules::parse_rules(&contents)
    }

    /// Load a product catalog from `catalog/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_catalog(&self, name: &str) -> Result<Catalog, FixtureError> {
        let file_path = self.base_path.join("catalog").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        Ok(fixture.into())
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a pricing table from an arbitrary YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the table is invalid.
pub fn load_rules_file(path: impl Into<PathBuf>) -> Result<PricingRules, FixtureError> {
    let contents = fs::read_to_string(path.into())?;

    rules::parse_rules(&contents)
}

/// Read a product catalog from an arbitrary YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_catalog_file(path: impl Into<PathBuf>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path.into())?;
    let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

    Ok(fixture.into())
}
