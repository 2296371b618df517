use std::io::Write;

use atelier::{storage::KeyValueStore, storefront::Storefront};

use super::table;

pub(crate) fn run<S: KeyValueStore>(
    storefront: &Storefront<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let calculator = storefront.calculator();
    let contact = storefront.contact();

    let rows = storefront.catalog().iter().map(|product| {
        let prices = calculator
            .price_range(&product.garment_type, false)
            .map_or_else(String::new, |(low, high)| {
                if low == high {
                    contact.money(&low)
                } else {
                    format!("{} - {}", contact.money(&low), contact.money(&high))
                }
            });

        let variants = product
            .variants
            .iter()
            .map(|variant| format!("{}/{}", variant.color, variant.size))
            .collect::<Vec<_>>()
            .join(", ");

        [
            product.id.to_string(),
            product.name.clone(),
            product.garment_type.clone(),
            prices,
            product.total_stock().to_string(),
            variants,
        ]
    });

    writeln!(
        out,
        "{}",
        table(
            ["Id", "Nombre", "Tipo", "Precio", "Stock", "Variantes"],
            rows,
        )
    )?;

    Ok(())
}
