//! Checkout Summary
//!
//! One pricing pass over both cart collections. The structured export, the order message
//! and the order document are all rendered from the same [`Summary`], so they can never
//! disagree on a number.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    discounts::percent_of_minor,
    items::{CartItemId, LineItem},
    prices::Price,
    pricing::{PriceBreakdown, PriceCalculator, line_subtotal},
};

pub mod document;
pub mod export;
pub mod message;

pub use document::{DocumentError, render_document, write_document};
pub use export::{ExportedLine, ExportedTotals, SummaryExport};
pub use message::{StoreContact, render_message};

/// Name shown for catalog lines whose product has no name.
pub const UNNAMED_PRODUCT: &str = "Producto";

/// Which collection a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    /// Custom cart
    Custom,
    /// Catalog cart
    Catalog,
}

/// A priced line of the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    /// Position in the summary, starting at 1
    pub number: usize,

    /// Cart line the summary line was built from
    pub cart_item_id: CartItemId,

    /// Originating collection
    pub source: LineSource,

    /// Display name
    pub name: String,

    /// Design display name, custom lines only
    pub design: Option<String>,

    /// Garment type key
    pub garment_type: String,

    /// Concrete size
    pub size: String,

    /// Color
    pub color: String,

    /// Units ordered
    pub quantity: u32,

    /// Unit pricing
    pub breakdown: PriceBreakdown,

    /// `discounted_unit_price * quantity`
    pub line_subtotal: Price,
}

/// Why a line was left out of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The line has no size
    MissingSize,
    /// The line has no garment type
    MissingGarmentType,
}

/// A line left out of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLine {
    /// Cart line that was skipped
    pub cart_item_id: CartItemId,

    /// Originating collection
    pub source: LineSource,

    /// Why it was skipped
    pub reason: SkipReason,
}

/// Aggregated amounts of a summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryTotals {
    /// Sum of custom line subtotals
    pub custom_subtotal: Price,

    /// Sum of catalog line subtotals
    pub catalog_subtotal: Price,

    /// Sum of every line subtotal
    pub subtotal: Price,

    /// `subtotal * tax_rate`
    pub tax: Price,

    /// `subtotal + tax`
    pub total: Price,

    /// Sum of line savings
    pub savings: Price,

    /// Units across included lines
    pub item_count: u32,
}

/// Checkout summary of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    lines: Vec<SummaryLine>,
    skipped: SmallVec<[SkippedLine; 2]>,
    totals: SummaryTotals,
    tax_rate: Decimal,
    currency: &'static Currency,
}

impl Summary {
    /// Included lines, custom lines first.
    pub fn lines(&self) -> &[SummaryLine] {
        &self.lines
    }

    /// Lines left out of the totals.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Aggregated amounts.
    pub fn totals(&self) -> &SummaryTotals {
        &self.totals
    }

    /// Tax rate the totals were computed with, as a fraction.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Whether no line made it into the summary.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines from one collection.
    pub fn lines_from(&self, source: LineSource) -> impl Iterator<Item = &SummaryLine> {
        self.lines.iter().filter(move |line| line.source == source)
    }
}

/// Price `items` in order and aggregate the totals.
///
/// Lines with a blank size or garment type are skipped and recorded in
/// [`Summary::skipped`]. `tax_rate` is a fraction (`0.18` for 18%).
pub fn build_summary<'a>(
    items: impl IntoIterator<Item = LineItem<'a>>,
    calculator: &PriceCalculator<'_>,
    tax_rate: Decimal,
) -> Summary {
    let rules = calculator.rules();
    let currency = rules.currency();

    let mut lines = Vec::new();
    let mut skipped = SmallVec::new();

    let mut custom_minor = 0_i64;
    let mut catalog_minor = 0_i64;
    let mut savings_minor = 0_i64;
    let mut item_count = 0_u32;

    for item in items {
        let source = if item.is_custom() {
            LineSource::Custom
        } else {
            LineSource::Catalog
        };

        let reason = if item.size().trim().is_empty() {
            Some(SkipReason::MissingSize)
        } else if item.garment_type().trim().is_empty() {
            Some(SkipReason::MissingGarmentType)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(id = %item.cart_item_id(), ?reason, "line skipped");

            skipped.push(SkippedLine {
                cart_item_id: item.cart_item_id(),
                source,
                reason,
            });

            continue;
        }

        let quantity = item.quantity().max(1);
        let breakdown =
            calculator.price_for(item.garment_type(), item.size(), quantity, item.is_custom());
        let subtotal = line_subtotal(&breakdown, quantity);

        match source {
            LineSource::Custom => {
                custom_minor = custom_minor.saturating_add(subtotal.to_minor_units());
            }
            LineSource::Catalog => {
                catalog_minor = catalog_minor.saturating_add(subtotal.to_minor_units());
            }
        }

        savings_minor = savings_minor.saturating_add(breakdown.savings.to_minor_units());
        item_count = item_count.saturating_add(quantity);

        let name = match item {
            LineItem::Custom(_) => rules.custom().name.clone(),
            LineItem::Catalog(line) if line.product.name.trim().is_empty() => {
                UNNAMED_PRODUCT.to_string()
            }
            LineItem::Catalog(line) => line.product.name.clone(),
        };

        lines.push(SummaryLine {
            number: lines.len() + 1,
            cart_item_id: item.cart_item_id(),
            source,
            name,
            design: item.design_name().map(str::to_string),
            garment_type: item.garment_type().to_string(),
            size: item.size().to_string(),
            color: item.color().to_string(),
            quantity,
            breakdown,
            line_subtotal: subtotal,
        });
    }

    let subtotal_minor = custom_minor.saturating_add(catalog_minor);

    let tax_minor = if tax_rate.is_zero() {
        0
    } else {
        percent_of_minor(&Percentage::from(tax_rate), subtotal_minor).unwrap_or_else(|err| {
            warn!(%err, %tax_rate, "tax could not be computed, charging none");

            0
        })
    };

    let totals = SummaryTotals {
        custom_subtotal: Money::from_minor(custom_minor, currency),
        catalog_subtotal: Money::from_minor(catalog_minor, currency),
        subtotal: Money::from_minor(subtotal_minor, currency),
        tax: Money::from_minor(tax_minor, currency),
        total: Money::from_minor(subtotal_minor.saturating_add(tax_minor), currency),
        savings: Money::from_minor(savings_minor, currency),
        item_count,
    };

    Summary {
        lines,
        skipped,
        totals,
        tax_rate,
        currency,
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::BOB;

    use crate::{
        items::{CatalogLineItem, CustomLineItem},
        pricing::rules::PricingRules,
        products::{ProductId, ProductRef},
    };

    use super::*;

    fn custom(id: u64, size: &str, quantity: u32) -> CustomLineItem {
        CustomLineItem {
            cart_item_id: CartItemId(id),
            garment_type: "polera".to_string(),
            material: "Algodon".to_string(),
            color: "negro".to_string(),
            design_ref: format!("imagenes/Estampado/EST_IMG{id}.png"),
            size: size.to_string(),
            quantity,
            custom_text: None,
            added_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn catalog(id: u64, name: &str, garment_type: &str, quantity: u32) -> CatalogLineItem {
        CatalogLineItem {
            cart_item_id: CartItemId(id),
            product: ProductRef {
                id: ProductId(1),
                name: name.to_string(),
                garment_type: garment_type.to_string(),
            },
            selected_color: "blanco".to_string(),
            selected_size: "M".to_string(),
            quantity,
            added_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn bob(minor: i64) -> Price {
        Money::from_minor(minor, BOB)
    }

    #[test]
    fn lines_are_numbered_in_input_order() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let first = custom(1, "M", 1);
        let second = custom(2, "S", 1);
        let third = catalog(3, "Polera Básica Algodón", "polera", 1);

        let summary = build_summary(
            [
                LineItem::Custom(&first),
                LineItem::Custom(&second),
                LineItem::Catalog(&third),
            ],
            &calculator,
            Decimal::ZERO,
        );

        let order: Vec<(usize, u64)> = summary
            .lines()
            .iter()
            .map(|line| (line.number, line.cart_item_id.0))
            .collect();

        assert_eq!(order, [(1, 1), (2, 2), (3, 3)]);
    }

    #[test]
    fn totals_add_subtotal_and_tax() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let line = catalog(1, "Polera Básica Algodón", "polera", 5);

        let summary = build_summary(
            [LineItem::Catalog(&line)],
            &calculator,
            Decimal::new(18, 2),
        );
        let totals = summary.totals();

        assert_eq!(totals.subtotal, bob(24_750));
        assert_eq!(totals.tax, bob(4455));
        assert_eq!(totals.total, bob(29_205));
        assert_eq!(totals.savings, bob(2750));
        assert_eq!(totals.item_count, 5);
    }

    #[test]
    fn subtotals_are_split_by_source() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let made = custom(1, "XL", 2);
        let bought = catalog(2, "Saco Elegante", "saco", 1);

        let summary = build_summary(
            [LineItem::Custom(&made), LineItem::Catalog(&bought)],
            &calculator,
            Decimal::ZERO,
        );
        let totals = summary.totals();

        assert_eq!(totals.custom_subtotal, bob(13_000));
        assert_eq!(totals.catalog_subtotal, bob(18_900));
        assert_eq!(totals.subtotal, bob(31_900));
        assert_eq!(summary.lines_from(LineSource::Custom).count(), 1);
    }

    #[test]
    fn malformed_lines_are_skipped_and_counted() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let no_size = custom(1, "", 2);
        let good = custom(2, "M", 1);
        let no_type = catalog(3, "Misterio", " ", 1);

        let summary = build_summary(
            [
                LineItem::Custom(&no_size),
                LineItem::Custom(&good),
                LineItem::Catalog(&no_type),
            ],
            &calculator,
            Decimal::ZERO,
        );

        assert_eq!(summary.lines().len(), 1);
        assert_eq!(summary.lines().first().map(|line| line.number), Some(1));
        assert_eq!(
            summary.skipped(),
            [
                SkippedLine {
                    cart_item_id: CartItemId(1),
                    source: LineSource::Custom,
                    reason: SkipReason::MissingSize,
                },
                SkippedLine {
                    cart_item_id: CartItemId(3),
                    source: LineSource::Catalog,
                    reason: SkipReason::MissingGarmentType,
                },
            ]
        );
        assert_eq!(summary.totals().subtotal, bob(6000));
    }

    #[test]
    fn empty_input_gives_zero_totals() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let summary = build_summary([], &calculator, Decimal::new(18, 2));

        assert!(summary.is_empty());
        assert_eq!(summary.totals().total, bob(0));
        assert_eq!(summary.totals().item_count, 0);
    }

    #[test]
    fn line_names_follow_source() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let made = custom(1, "M", 1);
        let nameless = catalog(2, "", "blusa", 1);

        let summary = build_summary(
            [LineItem::Custom(&made), LineItem::Catalog(&nameless)],
            &calculator,
            Decimal::ZERO,
        );

        let names: Vec<&str> = summary.lines().iter().map(|line| line.name.as_str()).collect();

        assert_eq!(names, ["Polera Personalizada", UNNAMED_PRODUCT]);
        assert_eq!(
            summary.lines().first().and_then(|line| line.design.as_deref()),
            Some("EST_IMG1")
        );
    }
}
