//! Integration test for the pricing table loaded from the storefront fixture.
//!
//! The YAML table must price exactly like the built-in one, and the volume discount must
//! switch on at the rule's threshold:
//!
//! - polera M: 55.00, 10% from 3 units -> 49.50
//! - custom L: 60.00, 5% from 12 units -> 57.00
//! - saco XL: 199.00, 10% from 3 units -> 179.10

use testresult::TestResult;

use atelier::prelude::*;

fn fixture_rules() -> Result<PricingRules, FixtureError> {
    Fixture::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
        .load_rules("storefront")
}

#[test]
fn fixture_table_prices_like_builtin() -> TestResult {
    let loaded = fixture_rules()?;
    let builtin = PricingRules::builtin();

    let loaded = PriceCalculator::new(&loaded);
    let builtin = PriceCalculator::new(&builtin);

    for garment_type in ["polera", "saco", "blusa", "solera", "desconocido"] {
        for size in ["XS", "S", "M", "L", "XL", "XXL", "4XL"] {
            for quantity in [1, 2, 3, 11, 12, 50] {
                for is_custom in [false, true] {
                    assert_eq!(
                        loaded.price_for(garment_type, size, quantity, is_custom),
                        builtin.price_for(garment_type, size, quantity, is_custom),
                        "{garment_type} {size} x{quantity} custom={is_custom}"
                    );
                }
            }
        }
    }

    Ok(())
}

#[test]
fn discount_switches_on_at_threshold() -> TestResult {
    let rules = fixture_rules()?;
    let calculator = PriceCalculator::new(&rules);

    let below = calculator.price_for("saco", "XL", 2, false);
    let at = calculator.price_for("saco", "XL", 3, false);

    assert!(!below.has_discount);
    assert_eq!(below.discounted_unit_price, below.base_price);
    assert_eq!(below.savings.to_minor_units(), 0);
    assert_eq!(below.min_quantity_for_discount, Some(3));

    assert!(at.has_discount);
    assert_eq!(at.base_price.to_minor_units(), 19_900);
    assert_eq!(at.discounted_unit_price.to_minor_units(), 17_910);
    assert_eq!(at.savings.to_minor_units(), (19_900 - 17_910) * 3);

    Ok(())
}

#[test]
fn reference_prices_hold() {
    let rules = PricingRules::builtin();
    let calculator = PriceCalculator::new(&rules);

    let polera = calculator.price_for("polera", "M", 5, false);
    let custom = calculator.price_for("polera", "L", 12, true);

    assert_eq!(polera.discounted_unit_price.to_minor_units(), 4950);
    assert_eq!(polera.savings.to_minor_units(), 2750);
    assert_eq!(custom.discounted_unit_price.to_minor_units(), 5700);
    assert_eq!(custom.savings.to_minor_units(), 3600);
}
