//! Products
//!
//! The ready-made catalog customers can add to the catalog cart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable color/size combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Color key (e.g. `blanco`)
    pub color: String,

    /// Concrete size (e.g. `M`)
    pub size: String,

    /// Units on hand, informational only
    pub stock: u32,
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Garment type key used for pricing (e.g. `polera`)
    #[serde(rename = "type")]
    pub garment_type: String,

    /// Catalog category
    #[serde(default)]
    pub category: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Available variants
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Total units on hand across all variants.
    pub fn total_stock(&self) -> u32 {
        self.variants
            .iter()
            .fold(0_u32, |sum, variant| sum.saturating_add(variant.stock))
    }

    /// Whether the product is offered in the given color and size.
    pub fn has_variant(&self, color: &str, size: &str) -> bool {
        self.variants
            .iter()
            .any(|variant| variant.color == color && variant.size == size)
    }

    /// The slice of product data a cart line keeps.
    pub fn to_ref(&self) -> ProductRef {
        ProductRef {
            id: self.id,
            name: self.name.clone(),
            garment_type: self.garment_type.clone(),
        }
    }
}

/// Product data frozen into a catalog cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product identifier
    pub id: ProductId,

    /// Product name at the time it was added
    pub name: String,

    /// Garment type key used for pricing
    #[serde(rename = "type")]
    pub garment_type: String,
}

/// Product catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from products.
    pub fn new(products: impl Into<Vec<Product>>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// The storefront's built-in catalog.
    pub fn builtin() -> Self {
        let variant = |color: &str, size: &str, stock: u32| Variant {
            color: color.to_string(),
            size: size.to_string(),
            stock,
        };

        Self::new([
            Product {
                id: ProductId(1),
                name: "Polera Básica Algodón".to_string(),
                garment_type: "polera".to_string(),
                category: "Algodon".to_string(),
                description: "Polera 100% algodón, cómoda y duradera".to_string(),
                variants: vec![
                    variant("blanco", "S", 15),
                    variant("blanco", "M", 20),
                    variant("blanco", "L", 18),
                    variant("negro", "S", 12),
                    variant("negro", "M", 10),
                    variant("azul", "M", 8),
                ],
            },
            Product {
                id: ProductId(2),
                name: "Polera Cuello V".to_string(),
                garment_type: "polera".to_string(),
                category: "V".to_string(),
                description: "Polera con cuello en V, estilo moderno".to_string(),
                variants: vec![
                    variant("blanco", "M", 8),
                    variant("blanco", "L", 10),
                    variant("negro", "L", 5),
                ],
            },
            Product {
                id: ProductId(3),
                name: "Saco Elegante".to_string(),
                garment_type: "saco".to_string(),
                category: "Sacos".to_string(),
                description: "Saco formal para ocasiones especiales".to_string(),
                variants: vec![
                    variant("negro", "M", 5),
                    variant("negro", "L", 3),
                    variant("gris", "L", 4),
                ],
            },
            Product {
                id: ProductId(4),
                name: "Blusa Estampada".to_string(),
                garment_type: "blusa".to_string(),
                category: "Blusas".to_string(),
                description: "Blusa con estampados elegantes".to_string(),
                variants: vec![
                    variant("blanco", "S", 12),
                    variant("blanco", "M", 15),
                    variant("rosa", "M", 8),
                ],
            },
        ])
    }

    /// Look up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Iterate the products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
