//! Pricing Rules
//!
//! The static table behind every price: base prices per garment type and size group,
//! and one volume discount rule per garment type (plus the custom pseudo-type).

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{BOB, Currency},
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::prices::Price;

/// Base price used for catalog garments whose type or size group is not configured.
pub const DEFAULT_BASE_PRICE_MINOR: i64 = 5500;

/// Base price used for custom garments whose size group is not configured.
pub const DEFAULT_CUSTOM_BASE_PRICE_MINOR: i64 = 6000;

/// Errors raised while building a pricing rules table.
#[derive(Debug, Error, PartialEq)]
pub enum PricingRulesError {
    /// Discount percentage outside `0..=100`.
    #[error("discount percentage {0} is outside 0..=100")]
    PercentageOutOfRange(Decimal),

    /// Discount threshold below one unit.
    #[error("discount minimum quantity must be at least 1")]
    ZeroMinQuantity,

    /// A price was given in a different currency from the table.
    #[error("price currency {found} does not match table currency {expected}")]
    CurrencyMismatch {
        /// Table currency code
        expected: &'static str,
        /// Offending price currency code
        found: &'static str,
    },
}

/// Coarse size bucket shared by several concrete sizes for pricing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeGroup {
    /// XS and S
    S,
    /// M and L
    ML,
    /// XL and XXL
    XL,
}

impl SizeGroup {
    /// Every size group, smallest first.
    pub const ALL: [SizeGroup; 3] = [SizeGroup::S, SizeGroup::ML, SizeGroup::XL];

    /// Resolves the size group for a concrete size.
    ///
    /// Unknown sizes fall into [`SizeGroup::ML`].
    pub fn for_size(size: &str) -> Self {
        match size {
            "XS" | "S" => SizeGroup::S,
            "XL" | "XXL" => SizeGroup::XL,
            _ => SizeGroup::ML,
        }
    }

    /// Short label used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            SizeGroup::S => "S",
            SizeGroup::ML => "ML",
            SizeGroup::XL => "XL",
        }
    }
}

/// Base price for one size group of a garment type.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceGroup {
    /// Size group this price applies to
    pub size_group: SizeGroup,

    /// Unit price before any discount
    pub base_price: Price,
}

/// Volume discount for a garment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    enabled: bool,
    percentage: Decimal,
    min_quantity: u32,
    description: String,
}

impl DiscountRule {
    /// Creates a discount rule.
    ///
    /// `percentage` is in percent points, so `10` means 10% off.
    ///
    /// # Errors
    ///
    /// Returns an error if `percentage` is outside `0..=100` or `min_quantity` is zero.
    pub fn new(
        enabled: bool,
        percentage: Decimal,
        min_quantity: u32,
        description: impl Into<String>,
    ) -> Result<Self, PricingRulesError> {
        if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(PricingRulesError::PercentageOutOfRange(percentage));
        }

        if min_quantity == 0 {
            return Err(PricingRulesError::ZeroMinQuantity);
        }

        Ok(Self {
            enabled,
            percentage,
            min_quantity,
            description: description.into(),
        })
    }

    /// A rule that never applies.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            percentage: Decimal::ZERO,
            min_quantity: 1,
            description: String::new(),
        }
    }

    fn tiered(percentage: u8, min_quantity: u32, description: &str) -> Self {
        Self {
            enabled: true,
            percentage: Decimal::from(percentage.min(100)),
            min_quantity: min_quantity.max(1),
            description: description.to_string(),
        }
    }

    /// Whether the rule is switched on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Discount in percent points.
    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// Smallest line quantity that earns the discount.
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Customer-facing description (e.g. "10% OFF desde 3 uni.").
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether a line of `quantity` units earns this discount.
    pub fn applies_to(&self, quantity: u32) -> bool {
        self.enabled && quantity >= self.min_quantity
    }
}

/// Prices and discount for one garment type.
#[derive(Debug, Clone, PartialEq)]
pub struct GarmentRules {
    /// Type key (e.g. `polera`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description of the garment type
    pub description: String,

    /// Base price per size group
    pub prices: SmallVec<[PriceGroup; 3]>,

    /// Volume discount
    pub discount: DiscountRule,
}

impl GarmentRules {
    /// Base price for a size group, if configured.
    pub fn base_price(&self, group: SizeGroup) -> Option<Price> {
        self.prices
            .iter()
            .find(|price_group| price_group.size_group == group)
            .map(|price_group| price_group.base_price)
    }

    /// Cheapest and dearest configured base prices.
    pub fn price_range(&self) -> Option<(Price, Price)> {
        let min = self
            .prices
            .iter()
            .min_by_key(|group| group.base_price.to_minor_units())?;

        let max = self
            .prices
            .iter()
            .max_by_key(|group| group.base_price.to_minor_units())?;

        Some((min.base_price, max.base_price))
    }
}

/// The full pricing table.
#[derive(Debug, Clone)]
pub struct PricingRules {
    currency: &'static Currency,
    types: FxHashMap<String, GarmentRules>,
    custom: GarmentRules,
    default_base_price: Price,
    default_custom_base_price: Price,
}

impl PricingRules {
    /// Creates a table from explicit garment rules.
    ///
    /// # Errors
    ///
    /// Returns [`PricingRulesError::CurrencyMismatch`] if any configured price is not in
    /// `currency`.
    pub fn new(
        currency: &'static Currency,
        types: impl IntoIterator<Item = GarmentRules>,
        custom: GarmentRules,
        default_base_price: Price,
        default_custom_base_price: Price,
    ) -> Result<Self, PricingRulesError> {
        let types: FxHashMap<String, GarmentRules> = types
            .into_iter()
            .map(|rules| (rules.id.clone(), rules))
            .collect();

        let prices = types
            .values()
            .chain([&custom])
            .flat_map(|rules| rules.prices.iter().map(|group| group.base_price))
            .chain([default_base_price, default_custom_base_price]);

        for price in prices {
            if price.currency() != currency {
                return Err(PricingRulesError::CurrencyMismatch {
                    expected: currency.iso_alpha_code,
                    found: price.currency().iso_alpha_code,
                });
            }
        }

        Ok(Self {
            currency,
            types,
            custom,
            default_base_price,
            default_custom_base_price,
        })
    }

    /// The storefront's built-in table.
    pub fn builtin() -> Self {
        let garment = |id: &str, name: &str, description: &str, prices: [i64; 3]| GarmentRules {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            prices: SizeGroup::ALL
                .into_iter()
                .zip(prices)
                .map(|(size_group, minor)| PriceGroup {
                    size_group,
                    base_price: Money::from_minor(minor, BOB),
                })
                .collect(),
            discount: DiscountRule::tiered(10, 3, "10% OFF desde 3 uni."),
        };

        let types = [
            garment(
                "polera",
                "Polera",
                "Poleras básicas de algodón",
                [5500, 5500, 6000],
            ),
            garment(
                "saco",
                "Saco",
                "Abrigos y sacos formales",
                [18_900, 18_900, 19_900],
            ),
            garment(
                "blusa",
                "Blusa",
                "Blusas y tops elegantes",
                [7700, 7700, 8200],
            ),
            garment(
                "solera",
                "Solera",
                "Prendas tradicionales",
                [9300, 9300, 9800],
            ),
        ];

        let custom = GarmentRules {
            discount: DiscountRule::tiered(5, 12, "5% OFF desde 12 uni."),
            ..garment(
                "custom",
                "Polera Personalizada",
                "Poleras personalizadas del diseñador",
                [6000, 6000, 6500],
            )
        };

        Self {
            currency: BOB,
            types: types
                .into_iter()
                .map(|rules| (rules.id.clone(), rules))
                .collect(),
            custom,
            default_base_price: Money::from_minor(DEFAULT_BASE_PRICE_MINOR, BOB),
            default_custom_base_price: Money::from_minor(DEFAULT_CUSTOM_BASE_PRICE_MINOR, BOB),
        }
    }

    /// Currency every price in the table is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Rules for a catalog garment type.
    pub fn garment(&self, garment_type: &str) -> Option<&GarmentRules> {
        self.types.get(garment_type)
    }

    /// Rules for the custom pseudo-type.
    pub fn custom(&self) -> &GarmentRules {
        &self.custom
    }

    /// Rules that price a line: the custom rules for custom lines, otherwise the type's.
    pub fn rules_for(&self, garment_type: &str, is_custom: bool) -> Option<&GarmentRules> {
        if is_custom {
            Some(&self.custom)
        } else {
            self.garment(garment_type)
        }
    }

    /// Base price used when a lookup misses.
    pub fn fallback_base_price(&self, is_custom: bool) -> Price {
        if is_custom {
            self.default_custom_base_price
        } else {
            self.default_base_price
        }
    }

    /// Iterate the catalog garment types, sorted by key.
    pub fn garments(&self) -> impl Iterator<Item = &GarmentRules> {
        let mut garments: Vec<&GarmentRules> = self.types.values().collect();
        garments.sort_by(|a, b| a.id.cmp(&b.id));

        garments.into_iter()
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn size_groups_follow_the_size_table() {
        assert_eq!(SizeGroup::for_size("XS"), SizeGroup::S);
        assert_eq!(SizeGroup::for_size("S"), SizeGroup::S);
        assert_eq!(SizeGroup::for_size("M"), SizeGroup::ML);
        assert_eq!(SizeGroup::for_size("L"), SizeGroup::ML);
        assert_eq!(SizeGroup::for_size("XL"), SizeGroup::XL);
        assert_eq!(SizeGroup::for_size("XXL"), SizeGroup::XL);
    }

    #[test]
    fn unknown_sizes_fall_into_ml() {
        assert_eq!(SizeGroup::for_size("3XL"), SizeGroup::ML);
        assert_eq!(SizeGroup::for_size(""), SizeGroup::ML);
    }

    #[test]
    fn discount_rule_rejects_out_of_range_percentage() {
        let result = DiscountRule::new(true, Decimal::from(101), 3, "");

        assert_eq!(
            result,
            Err(PricingRulesError::PercentageOutOfRange(Decimal::from(101)))
        );
    }

    #[test]
    fn discount_rule_rejects_zero_min_quantity() {
        let result = DiscountRule::new(true, Decimal::from(10), 0, "");

        assert_eq!(result, Err(PricingRulesError::ZeroMinQuantity));
    }

    #[test]
    fn discount_rule_applies_from_threshold() -> TestResult {
        let rule = DiscountRule::new(true, Decimal::from(10), 3, "10% OFF desde 3 uni.")?;

        assert!(!rule.applies_to(2));
        assert!(rule.applies_to(3));
        assert!(rule.applies_to(30));
        assert!(!DiscountRule::disabled().applies_to(100));

        Ok(())
    }

    #[test]
    fn builtin_table_prices_polera_by_group() {
        let rules = PricingRules::builtin();
        let polera = rules.garment("polera");

        assert_eq!(
            polera.and_then(|rules| rules.base_price(SizeGroup::ML)),
            Some(Money::from_minor(5500, BOB))
        );
        assert_eq!(
            polera.and_then(|rules| rules.base_price(SizeGroup::XL)),
            Some(Money::from_minor(6000, BOB))
        );
    }

    #[test]
    fn builtin_custom_rules_discount_from_twelve_units() {
        let rules = PricingRules::builtin();
        let discount = &rules.custom().discount;

        assert_eq!(discount.percentage(), Decimal::from(5));
        assert_eq!(discount.min_quantity(), 12);
    }

    #[test]
    fn rules_for_prefers_custom_rules_for_custom_lines() {
        let rules = PricingRules::builtin();

        let custom = rules.rules_for("saco", true).map(|rules| rules.id.as_str());
        let saco = rules.rules_for("saco", false).map(|rules| rules.id.as_str());

        assert_eq!(custom, Some("custom"));
        assert_eq!(saco, Some("saco"));
        assert!(rules.rules_for("gorra", false).is_none());
    }

    #[test]
    fn price_range_spans_size_groups() {
        let rules = PricingRules::builtin();

        let range = rules.garment("saco").and_then(GarmentRules::price_range);

        assert_eq!(
            range,
            Some((
                Money::from_minor(18_900, BOB),
                Money::from_minor(19_900, BOB)
            ))
        );
    }

    #[test]
    fn new_rejects_mixed_currencies() {
        let builtin = PricingRules::builtin();

        let result = PricingRules::new(
            BOB,
            builtin.garments().cloned(),
            builtin.custom().clone(),
            Money::from_minor(5500, USD),
            Money::from_minor(6000, BOB),
        );

        assert!(matches!(
            result,
            Err(PricingRulesError::CurrencyMismatch {
                expected: "BOB",
                found: "USD"
            })
        ));
    }

    #[test]
    fn garments_are_sorted_by_key() {
        let rules = PricingRules::builtin();

        let ids: Vec<&str> = rules.garments().map(|rules| rules.id.as_str()).collect();

        assert_eq!(ids, ["blusa", "polera", "saco", "solera"]);
    }
}
