//! Pricing Rule Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    prices::{Price, from_decimal},
    pricing::rules::{DiscountRule, GarmentRules, PriceGroup, PricingRules, SizeGroup},
};

/// Wrapper for a pricing table in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Base price for unknown catalog garment types (e.g., "55.00 BOB")
    pub default_base_price: String,

    /// Base price for custom garments in unconfigured size groups
    pub default_custom_base_price: String,

    /// Map of garment type key -> rules
    pub types: FxHashMap<String, GarmentFixture>,

    /// Rules for custom garments
    pub custom: GarmentFixture,
}

/// Garment Type Fixture
#[derive(Debug, Deserialize)]
pub struct GarmentFixture {
    /// Display name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Size group -> price (e.g., `ML: "55.00 BOB"`)
    pub prices: FxHashMap<SizeGroup, String>,

    /// Volume discount, absent for none
    #[serde(default)]
    pub discount: Option<DiscountFixture>,
}

/// Discount Rule Fixture
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Whether the rule applies
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Discount (e.g., "10%" or "0.10")
    pub percentage: String,

    /// Smallest quantity that earns the discount
    pub min_quantity: u32,

    /// Customer-facing description
    #[serde(default)]
    pub description: String,
}

fn enabled_by_default() -> bool {
    true
}

impl GarmentFixture {
    fn into_rules(self, id: String) -> Result<GarmentRules, FixtureError> {
        let mut prices = smallvec::SmallVec::new();

        for size_group in SizeGroup::ALL {
            let price = self
                .prices
                .get(&size_group)
                .ok_or_else(|| FixtureError::MissingSizeGroup {
                    garment_type: id.clone(),
                    size_group: size_group.as_str(),
                })?;

            prices.push(PriceGroup {
                size_group,
                base_price: parse_money(price)?,
            });
        }

        let discount = match self.discount {
            Some(discount) => DiscountRule::new(
                discount.enabled,
                parse_percentage_points(&discount.percentage)?,
                discount.min_quantity,
                discount.description,
            )?,
            None => DiscountRule::disabled(),
        };

        Ok(GarmentRules {
            id,
            name: self.name,
            description: self.description,
            prices,
            discount,
        })
    }
}

/// Parse a pricing table from YAML text.
///
/// The table currency is taken from the default base price.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price or percentage cannot be parsed,
/// a size group is missing, or the prices mix currencies.
pub fn parse_rules(contents: &str) -> Result<PricingRules, FixtureError> {
    let fixture: RulesFixture = serde_norway::from_str(contents)?;

    let default_base_price = parse_money(&fixture.default_base_price)?;
    let default_custom_base_price = parse_money(&fixture.default_custom_base_price)?;

    let types = fixture
        .types
        .into_iter()
        .map(|(id, garment)| garment.into_rules(id))
        .collect::<Result<Vec<_>, _>>()?;

    let custom = fixture.custom.into_rules("custom".to_string())?;

    Ok(PricingRules::new(
        default_base_price.currency(),
        types,
        custom,
        default_base_price,
        default_custom_base_price,
    )?)
}

fn parse_money(s: &str) -> Result<Price, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "55.00 BOB") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = Currency::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let price =
        from_decimal(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((price.to_minor_units(), currency))
}

/// Parse percentage string (e.g., "10%" or "0.10") into percent points
///
/// Accepts two formats:
/// - Percentage format: "10%" for 10 points
/// - Decimal format: "0.10" for 10 points
///
/// # Errors
///
/// Returns an error if the string cannot be parsed as a decimal.
pub fn parse_percentage_points(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    } else {
        trimmed
            .parse::<Decimal>()
            .map(|fraction| fraction * Decimal::ONE_HUNDRED)
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    }
}
