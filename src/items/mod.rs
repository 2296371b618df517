//! Items
//!
//! Cart line items. Custom lines describe a garment made to order from the designer;
//! catalog lines reference a ready-made product variant.

use std::{fmt, path::Path};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::products::{ProductId, ProductRef};

/// Cart line identifier.
///
/// Identifiers are handed out by [`CartItemIds`] and are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItemId(pub u64);

impl fmt::Display for CartItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic [`CartItemId`] generator.
#[derive(Debug, Clone)]
pub struct CartItemIds {
    next: u64,
}

impl CartItemIds {
    /// A generator starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// A generator that only hands out ids above every id in `existing`.
    pub fn after(existing: impl IntoIterator<Item = CartItemId>) -> Self {
        let mut ids = Self::new();

        for id in existing {
            ids.observe(id);
        }

        ids
    }

    /// Make sure `id` is never handed out.
    pub fn observe(&mut self, id: CartItemId) {
        self.next = self.next.max(id.0.saturating_add(1));
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> CartItemId {
        let id = CartItemId(self.next);
        self.next = self.next.saturating_add(1);

        id
    }
}

impl Default for CartItemIds {
    fn default() -> Self {
        Self::new()
    }
}

/// A customization submitted from the designer, before it enters the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomItem {
    /// Garment type key (e.g. `polera`)
    pub garment_type: String,

    /// Fabric (e.g. `Algodon`)
    pub material: String,

    /// Garment color
    pub color: String,

    /// Path or reference of the printed design
    pub design_ref: String,

    /// Concrete size
    pub size: String,

    /// Units ordered
    pub quantity: u32,

    /// Optional printed text
    pub custom_text: Option<String>,
}

/// A made-to-order line in the custom cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLineItem {
    /// Line identifier
    pub cart_item_id: CartItemId,

    /// Garment type key
    pub garment_type: String,

    /// Fabric
    pub material: String,

    /// Garment color
    pub color: String,

    /// Path or reference of the printed design
    pub design_ref: String,

    /// Concrete size
    pub size: String,

    /// Units ordered, at least 1
    pub quantity: u32,

    /// Optional printed text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,

    /// When the line entered the cart
    pub added_at: Timestamp,
}

impl CustomLineItem {
    /// Build a line from a designer submission.
    pub fn new(cart_item_id: CartItemId, item: NewCustomItem, added_at: Timestamp) -> Self {
        Self {
            cart_item_id,
            garment_type: item.garment_type,
            material: item.material,
            color: item.color,
            design_ref: item.design_ref,
            size: item.size,
            quantity: item.quantity.max(1),
            custom_text: item.custom_text,
            added_at,
        }
    }
}

/// A ready-made product line in the catalog cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLineItem {
    /// Line identifier
    pub cart_item_id: CartItemId,

    /// Product the line was added from
    pub product: ProductRef,

    /// Chosen color
    pub selected_color: String,

    /// Chosen size
    pub selected_size: String,

    /// Units ordered, at least 1
    pub quantity: u32,

    /// When the line entered the cart
    pub added_at: Timestamp,
}

impl CatalogLineItem {
    /// Whether this line has the given identity key.
    pub fn matches(&self, product: ProductId, color: &str, size: &str) -> bool {
        self.product.id == product && self.selected_color == color && self.selected_size == size
    }
}

/// A borrowed view over either kind of cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItem<'a> {
    /// Made-to-order line
    Custom(&'a CustomLineItem),

    /// Catalog line
    Catalog(&'a CatalogLineItem),
}

impl<'a> LineItem<'a> {
    /// Line identifier.
    pub fn cart_item_id(&self) -> CartItemId {
        match self {
            LineItem::Custom(item) => item.cart_item_id,
            LineItem::Catalog(item) => item.cart_item_id,
        }
    }

    /// Whether the line is priced with the custom rules.
    pub fn is_custom(&self) -> bool {
        matches!(self, LineItem::Custom(_))
    }

    /// Garment type key used for pricing.
    pub fn garment_type(&self) -> &'a str {
        match self {
            LineItem::Custom(item) => &item.garment_type,
            LineItem::Catalog(item) => &item.product.garment_type,
        }
    }

    /// Concrete size.
    pub fn size(&self) -> &'a str {
        match self {
            LineItem::Custom(item) => &item.size,
            LineItem::Catalog(item) => &item.selected_size,
        }
    }

    /// Color.
    pub fn color(&self) -> &'a str {
        match self {
            LineItem::Custom(item) => &item.color,
            LineItem::Catalog(item) => &item.selected_color,
        }
    }

    /// Units ordered.
    pub fn quantity(&self) -> u32 {
        match self {
            LineItem::Custom(item) => item.quantity,
            LineItem::Catalog(item) => item.quantity,
        }
    }

    /// Display name of the printed design, for custom lines.
    pub fn design_name(&self) -> Option<&'a str> {
        match self {
            LineItem::Custom(item) => Some(design_name_from_path(&item.design_ref)),
            LineItem::Catalog(_) => None,
        }
    }
}

/// Display name of a design: its file name without directory or extension.
///
/// Returns `N/A` for an empty reference.
pub fn design_name_from_path(design_ref: &str) -> &str {
    Path::new(design_ref)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("N/A")
}
