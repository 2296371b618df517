//! Structured export of a summary

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    items::CartItemId,
    prices::to_decimal,
    summary::{LineSource, Summary, SummaryLine, SummaryTotals},
};

/// A summary line with its amounts in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedLine {
    /// Position in the summary, starting at 1
    pub number: usize,

    /// Originating cart line
    pub cart_item_id: CartItemId,

    /// Originating collection
    pub source: LineSource,

    /// Display name
    pub name: String,

    /// Design display name, custom lines only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,

    /// Garment type key
    pub garment_type: String,

    /// Concrete size
    pub size: String,

    /// Color
    pub color: String,

    /// Units ordered
    pub quantity: u32,

    /// Unit price before discount
    pub base_price: Decimal,

    /// Unit price after discount
    pub unit_price: Decimal,

    /// Discount applied, in percent points
    pub discount_percentage: Decimal,

    /// Whether the discount applied
    pub has_discount: bool,

    /// Savings across the whole line
    pub savings: Decimal,

    /// `unit_price * quantity`
    pub subtotal: Decimal,
}

impl From<&SummaryLine> for ExportedLine {
    fn from(line: &SummaryLine) -> Self {
        Self {
            number: line.number,
            cart_item_id: line.cart_item_id,
            source: line.source,
            name: line.name.clone(),
            design: line.design.clone(),
            garment_type: line.garment_type.clone(),
            size: line.size.clone(),
            color: line.color.clone(),
            quantity: line.quantity,
            base_price: to_decimal(&line.breakdown.base_price),
            unit_price: to_decimal(&line.breakdown.discounted_unit_price),
            discount_percentage: line.breakdown.discount_percentage,
            has_discount: line.breakdown.has_discount,
            savings: to_decimal(&line.breakdown.savings),
            subtotal: to_decimal(&line.line_subtotal),
        }
    }
}

/// Summary totals in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTotals {
    /// Sum of custom line subtotals
    pub custom_subtotal: Decimal,

    /// Sum of catalog line subtotals
    pub catalog_subtotal: Decimal,

    /// Sum of every line subtotal
    pub subtotal: Decimal,

    /// Tax charged on the subtotal
    pub tax: Decimal,

    /// Amount due
    pub total: Decimal,

    /// Sum of line savings
    #[serde(default)]
    pub savings: Decimal,

    /// Units across included lines
    pub item_count: u32,

    /// Lines left out of the totals
    #[serde(default)]
    pub skipped: usize,
}

impl ExportedTotals {
    fn new(totals: &SummaryTotals, skipped: usize) -> Self {
        Self {
            custom_subtotal: to_decimal(&totals.custom_subtotal),
            catalog_subtotal: to_decimal(&totals.catalog_subtotal),
            subtotal: to_decimal(&totals.subtotal),
            tax: to_decimal(&totals.tax),
            total: to_decimal(&totals.total),
            savings: to_decimal(&totals.savings),
            item_count: totals.item_count,
            skipped,
        }
    }
}

/// Serializable form of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryExport {
    /// Custom lines
    pub custom_items: Vec<ExportedLine>,

    /// Catalog lines
    pub catalog_items: Vec<ExportedLine>,

    /// Aggregated amounts
    pub totals: ExportedTotals,

    /// ISO code of every amount
    pub currency: String,

    /// When the export was produced
    pub exported_at: Timestamp,
}

impl SummaryExport {
    /// Export `summary`, stamped with `exported_at`.
    pub fn new(summary: &Summary, exported_at: Timestamp) -> Self {
        Self {
            custom_items: summary
                .lines_from(LineSource::Custom)
                .map(ExportedLine::from)
                .collect(),
            catalog_items: summary
                .lines_from(LineSource::Catalog)
                .map(ExportedLine::from)
                .collect(),
            totals: ExportedTotals::new(summary.totals(), summary.skipped().len()),
            currency: summary.currency().iso_alpha_code.to_string(),
            exported_at,
        }
    }

    /// Every line, custom lines first.
    pub fn lines(&self) -> impl Iterator<Item = &ExportedLine> {
        self.custom_items.iter().chain(&self.catalog_items)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        items::{CatalogLineItem, CustomLineItem, LineItem},
        pricing::{PriceCalculator, rules::PricingRules},
        products::{ProductId, ProductRef},
        summary::build_summary,
    };

    use super::*;

    fn summary() -> Summary {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let custom = CustomLineItem {
            cart_item_id: CartItemId(1),
            garment_type: "polera".to_string(),
            material: "Algodon".to_string(),
            color: "negro".to_string(),
            design_ref: "imagenes/Estampado/EST_IMG7.png".to_string(),
            size: "M".to_string(),
            quantity: 12,
            custom_text: Some("YOLI".to_string()),
            added_at: Timestamp::UNIX_EPOCH,
        };

        let catalog = CatalogLineItem {
            cart_item_id: CartItemId(2),
            product: ProductRef {
                id: ProductId(1),
                name: "Polera Básica Algodón".to_string(),
                garment_type: "polera".to_string(),
            },
            selected_color: "blanco".to_string(),
            selected_size: "M".to_string(),
            quantity: 5,
            added_at: Timestamp::UNIX_EPOCH,
        };

        build_summary(
            [LineItem::Custom(&custom), LineItem::Catalog(&catalog)],
            &calculator,
            Decimal::ZERO,
        )
    }

    #[test]
    fn export_splits_lines_by_source() {
        let export = SummaryExport::new(&summary(), Timestamp::UNIX_EPOCH);

        assert_eq!(export.custom_items.len(), 1);
        assert_eq!(export.catalog_items.len(), 1);
        assert_eq!(export.currency, "BOB");
    }

    #[test]
    fn export_reads_summary_amounts() {
        let export = SummaryExport::new(&summary(), Timestamp::UNIX_EPOCH);

        let custom = export.custom_items.first();

        assert_eq!(custom.map(|line| line.unit_price), Some(Decimal::new(5700, 2)));
        assert_eq!(custom.map(|line| line.savings), Some(Decimal::new(3600, 2)));
        assert_eq!(custom.and_then(|line| line.design.as_deref()), Some("EST_IMG7"));
        assert_eq!(export.totals.subtotal, Decimal::new(93_150, 2));
        assert_eq!(export.totals.item_count, 17);
    }

    #[test]
    fn export_json_has_expected_shape() -> TestResult {
        let export = SummaryExport::new(&summary(), Timestamp::UNIX_EPOCH);

        let value: serde_json::Value = serde_json::from_str(&export.to_json()?)?;

        assert_eq!(value["totals"]["total"], "931.50");
        assert_eq!(value["catalog_items"][0]["source"], "catalog");
        assert_eq!(value["exported_at"], "1970-01-01T00:00:00Z");

        Ok(())
    }
}
