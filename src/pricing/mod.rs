//! Pricing
//!
//! Resolves the unit price of a line from the [`PricingRules`] table and applies the
//! garment type's volume discount.

use rust_decimal::Decimal;
use rusty_money::Money;
use tracing::warn;

use crate::{
    discounts::{from_points, percent_of_minor},
    prices::{Price, times, zero},
    pricing::rules::{DiscountRule, PricingRules, SizeGroup},
};

pub mod rules;

/// Pricing result for one line, before aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    /// Unit price before discount
    pub base_price: Price,

    /// Unit price after discount
    pub discounted_unit_price: Price,

    /// Discount applied, in percent points (zero when no discount applies)
    pub discount_percentage: Decimal,

    /// Whether the line earned the volume discount
    pub has_discount: bool,

    /// Savings across the whole line, not per unit: `(base - discounted) * quantity`.
    pub savings: Price,

    /// Threshold of the garment type's discount rule, when the type has an enabled rule
    pub min_quantity_for_discount: Option<u32>,
}

impl PriceBreakdown {
    fn undiscounted(base_price: Price, min_quantity_for_discount: Option<u32>) -> Self {
        Self {
            base_price,
            discounted_unit_price: base_price,
            discount_percentage: Decimal::ZERO,
            has_discount: false,
            savings: zero(base_price.currency()),
            min_quantity_for_discount,
        }
    }
}

/// Price difference between two garment types for the same size and quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceComparison {
    /// First garment type and its line total
    pub first: (String, Price),

    /// Second garment type and its line total
    pub second: (String, Price),

    /// Absolute difference between the two totals
    pub difference: Price,

    /// The cheaper garment type (the second one on a tie)
    pub cheaper: String,
}

/// Computes line prices from a rules table.
///
/// Every method is a pure function of its arguments and the table.
#[derive(Debug, Clone, Copy)]
pub struct PriceCalculator<'r> {
    rules: &'r PricingRules,
}

impl<'r> PriceCalculator<'r> {
    /// Create a calculator over a rules table.
    pub fn new(rules: &'r PricingRules) -> Self {
        Self { rules }
    }

    /// The rules table.
    pub fn rules(&self) -> &'r PricingRules {
        self.rules
    }

    /// Unit price before discount.
    ///
    /// Unknown garment types and unconfigured size groups fall back to the table's default
    /// base price.
    pub fn base_price(&self, garment_type: &str, size: &str, is_custom: bool) -> Price {
        let group = SizeGroup::for_size(size);

        self.rules
            .rules_for(garment_type, is_custom)
            .and_then(|rules| rules.base_price(group))
            .unwrap_or_else(|| self.rules.fallback_base_price(is_custom))
    }

    /// Price a line of `quantity` units.
    ///
    /// `quantity` must be at least 1; callers reject empty lines before pricing them.
    pub fn price_for(
        &self,
        garment_type: &str,
        size: &str,
        quantity: u32,
        is_custom: bool,
    ) -> PriceBreakdown {
        debug_assert!(quantity >= 1, "lines are priced with at least one unit");

        let base_price = self.base_price(garment_type, size, is_custom);

        let Some(rule) = self.enabled_rule(garment_type, is_custom) else {
            return PriceBreakdown::undiscounted(base_price, None);
        };

        if !rule.applies_to(quantity) {
            return PriceBreakdown::undiscounted(base_price, Some(rule.min_quantity()));
        }

        let base_minor = base_price.to_minor_units();

        let discount_minor = match percent_of_minor(&from_points(rule.percentage()), base_minor)
        {
            Ok(amount) => amount,
            Err(err) => {
                warn!(garment_type, size, %err, "discount could not be applied");

                return PriceBreakdown::undiscounted(base_price, Some(rule.min_quantity()));
            }
        };

        let currency = base_price.currency();

        PriceBreakdown {
            base_price,
            discounted_unit_price: Money::from_minor(
                base_minor.saturating_sub(discount_minor),
                currency,
            ),
            discount_percentage: rule.percentage(),
            has_discount: true,
            savings: Money::from_minor(
                discount_minor.saturating_mul(i64::from(quantity)),
                currency,
            ),
            min_quantity_for_discount: Some(rule.min_quantity()),
        }
    }

    /// Discounted line total: `discounted_unit_price * quantity`.
    pub fn line_total(
        &self,
        garment_type: &str,
        size: &str,
        quantity: u32,
        is_custom: bool,
    ) -> Price {
        let breakdown = self.price_for(garment_type, size, quantity, is_custom);

        line_subtotal(&breakdown, quantity)
    }

    /// The enabled discount rule for a garment type, if any.
    pub fn discount_info(&self, garment_type: &str, is_custom: bool) -> Option<&'r DiscountRule> {
        self.enabled_rule(garment_type, is_custom)
    }

    /// Whether `quantity` units earn the garment type's discount.
    pub fn qualifies_for_discount(
        &self,
        garment_type: &str,
        quantity: u32,
        is_custom: bool,
    ) -> bool {
        self.enabled_rule(garment_type, is_custom)
            .is_some_and(|rule| rule.applies_to(quantity))
    }

    /// Units needed to earn the garment type's discount.
    pub fn quantity_for_discount(&self, garment_type: &str, is_custom: bool) -> Option<u32> {
        self.enabled_rule(garment_type, is_custom)
            .map(DiscountRule::min_quantity)
    }

    /// Cheapest and dearest base price of a garment type.
    pub fn price_range(&self, garment_type: &str, is_custom: bool) -> Option<(Price, Price)> {
        self.rules.rules_for(garment_type, is_custom)?.price_range()
    }

    /// Compare the catalog line totals of two garment types.
    pub fn compare(&self, first: &str, second: &str, size: &str, quantity: u32) -> PriceComparison {
        let first_total = self.line_total(first, size, quantity, false);
        let second_total = self.line_total(second, size, quantity, false);

        let first_minor = first_total.to_minor_units();
        let second_minor = second_total.to_minor_units();

        let cheaper = if first_minor < second_minor {
            first
        } else {
            second
        };

        PriceComparison {
            first: (first.to_string(), first_total),
            second: (second.to_string(), second_total),
            difference: Money::from_minor(
                first_minor.abs_diff(second_minor).try_into().unwrap_or(i64::MAX),
                first_total.currency(),
            ),
            cheaper: cheaper.to_string(),
        }
    }

    fn enabled_rule(self, garment_type: &str, is_custom: bool) -> Option<&'r DiscountRule> {
        self.rules
            .rules_for(garment_type, is_custom)
            .map(|rules| &rules.discount)
            .filter(|rule| rule.enabled())
    }
}

/// Line subtotal for a breakdown: `discounted_unit_price * quantity`, saturating.
pub fn line_subtotal(breakdown: &PriceBreakdown, quantity: u32) -> Price {
    let unit = breakdown.discounted_unit_price;

    times(&unit, quantity).unwrap_or_else(|err| {
        warn!(%err, "line subtotal saturated");

        Money::from_minor(i64::MAX, unit.currency())
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::BOB;
    use testresult::TestResult;

    use crate::pricing::rules::{GarmentRules, PriceGroup};

    use super::*;

    fn bob(minor: i64) -> Price {
        Money::from_minor(minor, BOB)
    }

    #[test]
    fn polera_of_five_gets_ten_percent_off() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let breakdown = calculator.price_for("polera", "M", 5, false);

        assert_eq!(breakdown.base_price, bob(5500));
        assert_eq!(breakdown.discounted_unit_price, bob(4950));
        assert!(breakdown.has_discount);
        assert_eq!(breakdown.discount_percentage, Decimal::from(10));
        assert_eq!(breakdown.savings, bob(2750));
        assert_eq!(breakdown.min_quantity_for_discount, Some(3));
    }

    #[test]
    fn custom_line_of_twelve_gets_five_percent_off() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let breakdown = calculator.price_for("polera", "M", 12, true);

        assert_eq!(breakdown.base_price, bob(6000));
        assert_eq!(breakdown.discounted_unit_price, bob(5700));
        assert_eq!(breakdown.savings, bob(3600));
    }

    #[test]
    fn below_threshold_pays_base_price() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        for (garment_type, size, is_custom, min_quantity) in [
            ("polera", "M", false, 3),
            ("saco", "XL", false, 3),
            ("blusa", "S", false, 3),
            ("polera", "XXL", true, 12),
        ] {
            for quantity in 1..min_quantity {
                let breakdown = calculator.price_for(garment_type, size, quantity, is_custom);

                assert!(!breakdown.has_discount, "{garment_type} x{quantity}");
                assert_eq!(breakdown.discounted_unit_price, breakdown.base_price);
                assert_eq!(breakdown.savings, bob(0));
                assert_eq!(breakdown.min_quantity_for_discount, Some(min_quantity));
            }
        }
    }

    #[test]
    fn savings_scale_with_quantity() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        for quantity in [3_u32, 4, 10, 25] {
            let breakdown = calculator.price_for("solera", "L", quantity, false);

            let per_unit = breakdown.base_price.to_minor_units()
                - breakdown.discounted_unit_price.to_minor_units();

            assert_eq!(
                breakdown.savings.to_minor_units(),
                per_unit * i64::from(quantity)
            );
        }
    }

    #[test]
    fn price_for_is_deterministic() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let first = calculator.price_for("blusa", "XL", 7, false);
        let second = calculator.price_for("blusa", "XL", 7, false);

        assert_eq!(first, second);
    }

    #[test]
    fn unknown_type_falls_back_to_default_price_without_discount() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let breakdown = calculator.price_for("gorra", "M", 50, false);

        assert_eq!(breakdown.base_price, bob(5500));
        assert!(!breakdown.has_discount);
        assert_eq!(breakdown.min_quantity_for_discount, None);
    }

    #[test]
    fn unknown_size_prices_as_ml() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        assert_eq!(calculator.base_price("saco", "3XL", false), bob(18_900));
        assert_eq!(calculator.base_price("saco", "XXL", false), bob(19_900));
    }

    #[test]
    fn missing_size_group_falls_back_to_default_price() -> TestResult {
        let builtin = PricingRules::builtin();
        let short = GarmentRules {
            id: "gorra".to_string(),
            name: "Gorra".to_string(),
            description: String::new(),
            prices: [PriceGroup {
                size_group: SizeGroup::S,
                base_price: bob(3000),
            }]
            .into_iter()
            .collect(),
            discount: DiscountRule::disabled(),
        };

        let rules = PricingRules::new(
            BOB,
            [short],
            builtin.custom().clone(),
            bob(5500),
            bob(6000),
        )?;
        let calculator = PriceCalculator::new(&rules);

        assert_eq!(calculator.base_price("gorra", "S", false), bob(3000));
        assert_eq!(calculator.base_price("gorra", "XL", false), bob(5500));

        Ok(())
    }

    #[test]
    fn disabled_rule_never_discounts() -> TestResult {
        let builtin = PricingRules::builtin();
        let mut polera = builtin
            .garment("polera")
            .cloned()
            .ok_or("missing polera rules")?;
        polera.discount = DiscountRule::new(false, Decimal::from(10), 3, "")?;

        let rules = PricingRules::new(
            BOB,
            [polera],
            builtin.custom().clone(),
            bob(5500),
            bob(6000),
        )?;
        let calculator = PriceCalculator::new(&rules);

        let breakdown = calculator.price_for("polera", "M", 30, false);

        assert!(!breakdown.has_discount);
        assert_eq!(breakdown.min_quantity_for_discount, None);
        assert!(calculator.discount_info("polera", false).is_none());

        Ok(())
    }

    #[test]
    fn line_total_multiplies_discounted_price() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        assert_eq!(calculator.line_total("polera", "M", 5, false), bob(24_750));
        assert_eq!(calculator.line_total("polera", "M", 2, false), bob(11_000));
    }

    #[test]
    fn discount_helpers_read_the_rule() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        assert_eq!(calculator.quantity_for_discount("saco", false), Some(3));
        assert_eq!(calculator.quantity_for_discount("saco", true), Some(12));
        assert_eq!(calculator.quantity_for_discount("gorra", false), None);
        assert!(calculator.qualifies_for_discount("saco", 3, false));
        assert!(!calculator.qualifies_for_discount("saco", 3, true));
        assert_eq!(
            calculator
                .discount_info("blusa", false)
                .map(DiscountRule::description),
            Some("10% OFF desde 3 uni.")
        );
    }

    #[test]
    fn compare_reports_cheaper_type() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let comparison = calculator.compare("saco", "polera", "M", 1);

        assert_eq!(comparison.cheaper, "polera");
        assert_eq!(comparison.difference, bob(13_400));
    }
}
