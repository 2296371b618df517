use std::io::Write;

use anyhow::ensure;
use atelier::{storage::KeyValueStore, storefront::Storefront, summary::StoreContact};
use clap::Args;

use super::table;

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Garment type key, e.g. `polera`
    garment_type: String,

    /// Size label, e.g. `M`
    size: String,

    /// Units in the line
    #[arg(default_value_t = 1)]
    quantity: u32,

    /// Price as a custom-designed garment
    #[arg(long)]
    custom: bool,

    /// Also compare against another garment type
    #[arg(long)]
    versus: Option<String>,
}

pub(crate) fn run<S: KeyValueStore>(
    storefront: &Storefront<S>,
    args: QuoteArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    ensure!(args.quantity >= 1, "quantity must be at least 1");

    let calculator = storefront.calculator();
    let contact = storefront.contact();

    let breakdown = calculator.price_for(
        &args.garment_type,
        &args.size,
        args.quantity,
        args.custom,
    );
    let total = calculator.line_total(&args.garment_type, &args.size, args.quantity, args.custom);

    let discount = if breakdown.has_discount {
        format!("{}%", breakdown.discount_percentage.normalize())
    } else {
        "-".to_string()
    };

    let rows = [
        [
            "Precio base".to_string(),
            contact.money(&breakdown.base_price),
        ],
        [
            "Precio unitario".to_string(),
            contact.money(&breakdown.discounted_unit_price),
        ],
        ["Descuento".to_string(), discount],
        ["Subtotal".to_string(), contact.money(&total)],
        ["Ahorro".to_string(), contact.money(&breakdown.savings)],
    ];

    writeln!(out, "{}", table(["Concepto", "Valor"], rows))?;

    let pending_rule = calculator
        .discount_info(&args.garment_type, args.custom)
        .filter(|_| !breakdown.has_discount);

    if let Some(rule) = pending_rule {
        writeln!(
            out,
            "{} ({} uni. para el descuento)",
            rule.description(),
            rule.min_quantity()
        )?;
    }

    if let Some(versus) = args.versus {
        write_comparison(
            out,
            storefront,
            &contact,
            (&args.garment_type, &versus),
            &args.size,
            args.quantity,
        )?;
    }

    Ok(())
}

fn write_comparison<S: KeyValueStore>(
    out: &mut impl Write,
    storefront: &Storefront<S>,
    contact: &StoreContact,
    (first, second): (&str, &str),
    size: &str,
    quantity: u32,
) -> anyhow::Result<()> {
    let comparison = storefront.calculator().compare(first, second, size, quantity);

    let rows = [&comparison.first, &comparison.second]
        .map(|(garment_type, total)| [garment_type.clone(), contact.money(total)]);

    writeln!(out, "{}", table(["Tipo", "Total"], rows))?;
    writeln!(
        out,
        "Más económico: {} (diferencia {})",
        comparison.cheaper,
        contact.money(&comparison.difference)
    )?;

    Ok(())
}
