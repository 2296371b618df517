//! Command line configuration

use std::path::PathBuf;

use atelier::{
    fixtures::{FixtureError, load_catalog_file, load_rules_file},
    pricing::rules::PricingRules,
    products::Catalog,
    storage::{FileStore, StorageError},
    storefront::Storefront,
};
use clap::Args;
use thiserror::Error;
use tracing::debug;

/// Errors raised while opening the configured storefront.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The pricing table or catalog file is unusable.
    #[error("failed to load fixture: {0}")]
    Fixture(#[from] FixtureError),

    /// The data directory is unusable.
    #[error("failed to open data directory: {0}")]
    Storage(#[from] StorageError),
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub(crate) log_format: LogFormat,
}

/// Storefront data settings.
#[derive(Debug, Args)]
pub(crate) struct StoreConfig {
    /// Directory holding the cart, orders and settings
    #[arg(long, env = "ATELIER_DATA_DIR", default_value = ".atelier", global = true)]
    pub(crate) data_dir: PathBuf,

    /// Pricing table YAML file; the built-in table is used when omitted
    #[arg(long, env = "ATELIER_RULES", global = true)]
    pub(crate) rules: Option<PathBuf>,

    /// Product catalog YAML file; the built-in catalog is used when omitted
    #[arg(long, env = "ATELIER_CATALOG", global = true)]
    pub(crate) catalog: Option<PathBuf>,
}

impl StoreConfig {
    /// Open the storefront described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or a fixture file is unusable.
    pub(crate) fn open(&self) -> Result<Storefront<FileStore>, ConfigError> {
        let store = FileStore::open(&self.data_dir)?;

        let rules = match &self.rules {
            Some(path) => load_rules_file(path)?,
            None => PricingRules::builtin(),
        };

        let catalog = match &self.catalog {
            Some(path) => load_catalog_file(path)?,
            None => Catalog::builtin(),
        };

        debug!(
            data_dir = %self.data_dir.display(),
            products = catalog.len(),
            "storefront opened"
        );

        Ok(Storefront::with_rules(store, rules, catalog))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn opens_builtin_storefront_in_fresh_directory() -> TestResult {
        let dir = tempfile::tempdir()?;

        let config = StoreConfig {
            data_dir: dir.path().join("data"),
            rules: None,
            catalog: None,
        };

        let storefront = config.open()?;

        assert!(storefront.cart().is_empty());
        assert_eq!(storefront.catalog().len(), 4);
        assert!(dir.path().join("data").is_dir());

        Ok(())
    }

    #[test]
    fn missing_rules_file_is_reported() -> TestResult {
        let dir = tempfile::tempdir()?;

        let config = StoreConfig {
            data_dir: dir.path().to_path_buf(),
            rules: Some(dir.path().join("missing.yml")),
            catalog: None,
        };

        assert!(matches!(config.open(), Err(ConfigError::Fixture(_))));

        Ok(())
    }
}
