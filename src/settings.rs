//! Store settings
//!
//! Persisted under [`keys::SETTINGS`]. Partial updates merge into the current settings and
//! are validated before they are stored.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::storage::{KeyValueStore, StorageError, keys, load_or_default, save_json};

/// Errors raised when updating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Tax rate outside `0..=1`.
    #[error("tax rate {0} must be a fraction between 0 and 1")]
    TaxRateOutOfRange(Decimal),

    /// An amount that must not be negative is.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Setting name
        field: &'static str,
        /// Rejected value
        value: Decimal,
    },

    /// No setting has this name.
    #[error("unknown setting: {0}")]
    UnknownField(String),

    /// The value cannot be parsed for this setting.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// Settings could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Admin panel color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme
    #[default]
    Light,
    /// Dark scheme
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Store name
    pub store_name: String,

    /// Contact email
    pub store_email: String,

    /// Contact phone
    pub store_phone: String,

    /// Tax charged at checkout, as a fraction. Zero unless configured.
    pub tax_rate: Decimal,

    /// Flat shipping cost
    pub shipping_cost: Decimal,

    /// Subtotal from which shipping is free
    pub free_shipping_threshold: Decimal,

    /// Currency label shown to customers
    pub currency: String,

    /// Admin color scheme
    pub theme: Theme,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "YOLIMAR".to_string(),
            store_email: "info@yolimar.pe".to_string(),
            store_phone: "+51 999 999 999".to_string(),
            tax_rate: Decimal::ZERO,
            shipping_cost: Decimal::from(15),
            free_shipping_threshold: Decimal::from(200),
            currency: "Bs".to_string(),
            theme: Theme::Light,
        }
    }
}

impl StoreSettings {
    /// Shipping charged on `subtotal`: free from the threshold up.
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping_cost
        }
    }

    /// `amount` plus tax, to two places.
    pub fn with_tax(&self, amount: Decimal) -> Decimal {
        (amount + amount * self.tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(SettingsError::TaxRateOutOfRange(self.tax_rate));
        }

        for (field, value) in [
            ("shipping_cost", self.shipping_cost),
            ("free_shipping_threshold", self.free_shipping_threshold),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(SettingsError::NegativeAmount { field, value });
            }
        }

        Ok(())
    }
}

/// A partial settings update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    /// New store name
    pub store_name: Option<String>,

    /// New contact email
    pub store_email: Option<String>,

    /// New contact phone
    pub store_phone: Option<String>,

    /// New tax rate, as a fraction
    pub tax_rate: Option<Decimal>,

    /// New flat shipping cost
    pub shipping_cost: Option<Decimal>,

    /// New free-shipping threshold
    pub free_shipping_threshold: Option<Decimal>,

    /// New currency label
    pub currency: Option<String>,

    /// New color scheme
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    /// A patch setting one field by name, parsing `value` for that field.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown field or a value that does not parse.
    pub fn field(name: &str, value: &str) -> Result<Self, SettingsError> {
        let decimal = |field: &'static str| {
            value
                .trim()
                .parse::<Decimal>()
                .map_err(|_err| SettingsError::InvalidValue {
                    field,
                    value: value.to_string(),
                })
        };

        let mut patch = Self::default();

        match name {
            "store_name" => patch.store_name = Some(value.to_string()),
            "store_email" => patch.store_email = Some(value.to_string()),
            "store_phone" => patch.store_phone = Some(value.to_string()),
            "tax_rate" => patch.tax_rate = Some(decimal("tax_rate")?),
            "shipping_cost" => patch.shipping_cost = Some(decimal("shipping_cost")?),
            "free_shipping_threshold" => {
                patch.free_shipping_threshold = Some(decimal("free_shipping_threshold")?);
            }
            "currency" => patch.currency = Some(value.to_string()),
            "theme" => {
                patch.theme = Some(match value.trim() {
                    "light" => Theme::Light,
                    "dark" => Theme::Dark,
                    _ => {
                        return Err(SettingsError::InvalidValue {
                            field: "theme",
                            value: value.to_string(),
                        });
                    }
                });
            }
            other => return Err(SettingsError::UnknownField(other.to_string())),
        }

        Ok(patch)
    }

    fn apply(self, settings: &mut StoreSettings) {
        if let Some(store_name) = self.store_name {
            settings.store_name = store_name;
        }
        if let Some(store_email) = self.store_email {
            settings.store_email = store_email;
        }
        if let Some(store_phone) = self.store_phone {
            settings.store_phone = store_phone;
        }
        if let Some(tax_rate) = self.tax_rate {
            settings.tax_rate = tax_rate;
        }
        if let Some(shipping_cost) = self.shipping_cost {
            settings.shipping_cost = shipping_cost;
        }
        if let Some(threshold) = self.free_shipping_threshold {
            settings.free_shipping_threshold = threshold;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
    }
}

/// Persisted settings.
#[derive(Debug)]
pub struct Settings<S> {
    store: S,
    current: StoreSettings,
}

impl<S: KeyValueStore> Settings<S> {
    /// Load settings from `store`, falling back to defaults.
    pub fn load(store: S) -> Self {
        let current = load_or_default(&store, keys::SETTINGS);

        Self { store, current }
    }

    /// Current settings.
    pub fn get(&self) -> &StoreSettings {
        &self.current
    }

    /// Merge `patch` into the current settings and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings are invalid or cannot be persisted; the
    /// current settings are unchanged on error.
    pub fn update(&mut self, patch: SettingsPatch) -> Result<&StoreSettings, SettingsError> {
        let mut next = self.current.clone();
        patch.apply(&mut next);
        next.validate()?;

        save_json(&self.store, keys::SETTINGS, &next)?;
        self.current = next;

        info!("settings updated");

        Ok(&self.current)
    }

    /// Restore and persist the default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults cannot be persisted.
    pub fn reset(&mut self) -> Result<&StoreSettings, SettingsError> {
        let defaults = StoreSettings::default();

        save_json(&self.store, keys::SETTINGS, &defaults)?;
        self.current = defaults;

        Ok(&self.current)
    }
}
