//! Catalog Fixtures

use serde::Deserialize;

use crate::products::{Catalog, Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products in catalog order
    pub products: Vec<Product>,
}

impl From<CatalogFixture> for Catalog {
    fn from(fixture: CatalogFixture) -> Self {
        Catalog::new(fixture.products)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::ProductId;

    use super::*;

    #[test]
    fn products_deserialize_with_type_key() -> TestResult {
        let yaml = r"
products:
  - id: 9
    name: Gorra Bordada
    type: gorra
    variants:
      - { color: negro, size: M, stock: 4 }
";

        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
        let catalog = Catalog::from(fixture);
        let gorra = catalog.get(ProductId(9)).ok_or("missing product 9")?;

        assert_eq!(gorra.garment_type, "gorra");
        assert!(gorra.category.is_empty());
        assert!(gorra.has_variant("negro", "M"));

        Ok(())
    }
}
