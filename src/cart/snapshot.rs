//! Cart snapshot

use crate::{
    items::{CatalogLineItem, CustomLineItem},
    prices::Price,
    summary::Summary,
};

/// Cart contents together with their derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    /// Custom lines, in insertion order
    pub custom_items: Vec<CustomLineItem>,

    /// Catalog lines, in insertion order
    pub catalog_items: Vec<CatalogLineItem>,

    /// Sum of custom line subtotals
    pub custom_subtotal: Price,

    /// Sum of catalog line subtotals
    pub catalog_subtotal: Price,

    /// Units across every priced line
    pub total_items: u32,

    /// Custom and catalog subtotals combined
    pub subtotal: Price,

    /// Tax on the subtotal
    pub tax: Price,

    /// Amount due
    pub total: Price,
}

impl CartSnapshot {
    pub(crate) fn new(
        custom_items: Vec<CustomLineItem>,
        catalog_items: Vec<CatalogLineItem>,
        summary: &Summary,
    ) -> Self {
        let totals = summary.totals();

        Self {
            custom_items,
            catalog_items,
            custom_subtotal: totals.custom_subtotal,
            catalog_subtotal: totals.catalog_subtotal,
            total_items: totals.item_count,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
        }
    }

    /// Whether both collections are empty.
    pub fn is_empty(&self) -> bool {
        self.custom_items.is_empty() && self.catalog_items.is_empty()
    }
}
