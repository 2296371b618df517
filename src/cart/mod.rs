//! Cart
//!
//! Two ordered collections, custom lines and catalog lines, kept in memory and mirrored to a
//! [`KeyValueStore`] after every mutation.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    items::{CartItemId, CartItemIds, CatalogLineItem, CustomLineItem, LineItem, NewCustomItem},
    pricing::PriceCalculator,
    products::Product,
    storage::{KeyValueStore, keys, load_or_default, save_json},
    summary::{Summary, build_summary},
};

mod snapshot;

pub use snapshot::CartSnapshot;

/// Errors raised when validating a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Nothing to check out.
    #[error("El carrito está vacío")]
    Empty,
}

/// Which collection an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartSection {
    /// Custom lines only
    Custom,
    /// Catalog lines only
    Catalog,
    /// Both collections
    All,
}

/// The shopper's cart.
#[derive(Debug)]
pub struct Cart<S> {
    store: S,
    custom: Vec<CustomLineItem>,
    catalog: Vec<CatalogLineItem>,
    ids: CartItemIds,
}

impl<S: KeyValueStore> Cart<S> {
    /// Load both collections from `store`.
    ///
    /// Unreadable collections start empty. New ids are issued above every loaded id.
    pub fn load(store: S) -> Self {
        let custom: Vec<CustomLineItem> = load_or_default(&store, keys::CART_CUSTOM);
        let catalog: Vec<CatalogLineItem> = load_or_default(&store, keys::CART_CATALOG);

        let ids = CartItemIds::after(
            custom
                .iter()
                .map(|item| item.cart_item_id)
                .chain(catalog.iter().map(|item| item.cart_item_id)),
        );

        debug!(
            custom = custom.len(),
            catalog = catalog.len(),
            "cart loaded"
        );

        Self {
            store,
            custom,
            catalog,
            ids,
        }
    }

    /// Add a made-to-order line. Custom lines never merge.
    pub fn add_custom(&mut self, item: NewCustomItem) -> CartItemId {
        let id = self.ids.next_id();
        let line = CustomLineItem::new(id, item, Timestamp::now());

        debug!(
            %id,
            garment_type = %line.garment_type,
            quantity = line.quantity,
            "custom line added"
        );

        self.custom.push(line);
        self.save_custom();

        id
    }

    /// Add units of a product variant, merging into an existing line with the same
    /// product, color and size.
    pub fn add_catalog(
        &mut self,
        product: &Product,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> CartItemId {
        let quantity = quantity.max(1);

        let id = if let Some(existing) = self
            .catalog
            .iter_mut()
            .find(|line| line.matches(product.id, color, size))
        {
            existing.quantity = existing.quantity.saturating_add(quantity);

            debug!(
                id = %existing.cart_item_id,
                quantity = existing.quantity,
                "catalog line merged"
            );

            existing.cart_item_id
        } else {
            let id = self.ids.next_id();

            self.catalog.push(CatalogLineItem {
                cart_item_id: id,
                product: product.to_ref(),
                selected_color: color.to_string(),
                selected_size: size.to_string(),
                quantity,
                added_at: Timestamp::now(),
            });

            debug!(%id, product = %product.id, quantity, "catalog line added");

            id
        };

        self.save_catalog();

        id
    }

    /// Remove a custom line. Unknown ids are ignored.
    pub fn remove_custom(&mut self, id: CartItemId) {
        self.custom.retain(|line| line.cart_item_id != id);
        self.save_custom();
    }

    /// Remove a catalog line. Unknown ids are ignored.
    pub fn remove_catalog(&mut self, id: CartItemId) {
        self.catalog.retain(|line| line.cart_item_id != id);
        self.save_catalog();
    }

    /// Set the quantity of a custom line, clamped to at least 1.
    pub fn update_custom_quantity(&mut self, id: CartItemId, quantity: u32) {
        let Some(line) = self.custom.iter_mut().find(|line| line.cart_item_id == id) else {
            return;
        };

        line.quantity = quantity.max(1);
        self.save_custom();
    }

    /// Adjust the quantity of a catalog line by `delta`.
    ///
    /// A resulting quantity of zero or less removes the line.
    pub fn update_catalog_quantity(&mut self, id: CartItemId, delta: i64) {
        let Some(position) = self.catalog_position(id) else {
            return;
        };

        let Some(line) = self.catalog.get_mut(position) else {
            return;
        };

        let quantity = i64::from(line.quantity).saturating_add(delta);

        if quantity <= 0 {
            self.catalog.remove(position);

            debug!(%id, "catalog line removed by quantity update");
        } else {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.save_catalog();
    }

    /// Switch a catalog line to another color and size, keeping its id and quantity.
    ///
    /// A line that ends up with the same identity key as another is not merged with it.
    pub fn update_catalog_variant(&mut self, id: CartItemId, color: &str, size: &str) {
        let Some(line) = self.catalog.iter_mut().find(|line| line.cart_item_id == id) else {
            return;
        };

        line.selected_color = color.to_string();
        line.selected_size = size.to_string();

        debug!(%id, color, size, "catalog variant updated");

        self.save_catalog();
    }

    /// Empty one or both collections.
    pub fn clear(&mut self, section: CartSection) {
        if matches!(section, CartSection::Custom | CartSection::All) {
            self.custom.clear();
            self.save_custom();
        }

        if matches!(section, CartSection::Catalog | CartSection::All) {
            self.catalog.clear();
            self.save_catalog();
        }
    }

    /// Custom lines in insertion order.
    pub fn custom_items(&self) -> &[CustomLineItem] {
        &self.custom
    }

    /// Catalog lines in insertion order.
    pub fn catalog_items(&self) -> &[CatalogLineItem] {
        &self.catalog
    }

    /// Every line, custom lines first.
    pub fn line_items(&self) -> impl Iterator<Item = LineItem<'_>> {
        self.custom
            .iter()
            .map(LineItem::Custom)
            .chain(self.catalog.iter().map(LineItem::Catalog))
    }

    /// Find a line in either collection.
    pub fn find(&self, id: CartItemId) -> Option<LineItem<'_>> {
        self.line_items().find(|line| line.cart_item_id() == id)
    }

    /// Whether both collections are empty.
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.catalog.is_empty()
    }

    /// Number of lines across both collections.
    pub fn item_count(&self) -> usize {
        self.custom.len() + self.catalog.len()
    }

    /// Number of units across both collections.
    pub fn total_items(&self) -> u32 {
        self.line_items()
            .fold(0_u32, |sum, line| sum.saturating_add(line.quantity()))
    }

    /// Check the cart can be checked out.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] when there are no lines.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }

        Ok(())
    }

    /// Price every line and aggregate the totals.
    pub fn summary(&self, calculator: &PriceCalculator<'_>, tax_rate: Decimal) -> Summary {
        build_summary(self.line_items(), calculator, tax_rate)
    }

    /// Current contents with derived totals.
    pub fn snapshot(&self, calculator: &PriceCalculator<'_>, tax_rate: Decimal) -> CartSnapshot {
        CartSnapshot::new(
            self.custom.clone(),
            self.catalog.clone(),
            &self.summary(calculator, tax_rate),
        )
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn catalog_position(&self, id: CartItemId) -> Option<usize> {
        self.catalog.iter().position(|line| line.cart_item_id == id)
    }

    fn save_custom(&self) {
        if let Err(err) = save_json(&self.store, keys::CART_CUSTOM, &self.custom) {
            warn!(%err, "custom cart not persisted, keeping in-memory state");
        }
    }

    fn save_catalog(&self) {
        if let Err(err) = save_json(&self.store, keys::CART_CATALOG, &self.catalog) {
            warn!(%err, "catalog cart not persisted, keeping in-memory state");
        }
    }
}
