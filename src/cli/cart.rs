use std::io::Write;

use anyhow::{Context, ensure};
use atelier::{
    cart::CartSection,
    items::{CartItemId, LineItem, NewCustomItem},
    products::ProductId,
    storage::KeyValueStore,
    storefront::Storefront,
    summary::{LineSource, Summary, StoreContact, message::EMPTY_CART_MESSAGE},
};
use clap::{Args, Subcommand, ValueEnum};

use super::table;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show every line with its price and the cart totals
    Show,
    /// Add a made-to-order garment
    AddCustom(AddCustomArgs),
    /// Add units of a catalog product variant
    AddCatalog(AddCatalogArgs),
    /// Remove a line
    Remove {
        /// Line id as shown by `cart show`
        id: u64,
    },
    /// Change the quantity of a line by a relative amount
    Qty {
        /// Line id as shown by `cart show`
        id: u64,

        /// Units to add, negative to remove
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Switch a catalog line to another color and size
    Variant {
        /// Line id as shown by `cart show`
        id: u64,

        /// New color
        #[arg(long)]
        color: String,

        /// New size
        #[arg(long)]
        size: String,
    },
    /// Empty the cart
    Clear {
        /// Collection to empty
        #[arg(long, value_enum, default_value_t = Section::All)]
        section: Section,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Section {
    Custom,
    Catalog,
    All,
}

impl From<Section> for CartSection {
    fn from(section: Section) -> Self {
        match section {
            Section::Custom => CartSection::Custom,
            Section::Catalog => CartSection::Catalog,
            Section::All => CartSection::All,
        }
    }
}

#[derive(Debug, Args)]
struct AddCustomArgs {
    /// Garment type key, e.g. `polera`
    #[arg(long = "type")]
    garment_type: String,

    /// Size label
    #[arg(long)]
    size: String,

    /// Units
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Fabric
    #[arg(long, default_value = "Algodon")]
    material: String,

    /// Garment color
    #[arg(long, default_value = "blanco")]
    color: String,

    /// Path of the printed design
    #[arg(long)]
    design: String,

    /// Printed text
    #[arg(long)]
    text: Option<String>,
}

#[derive(Debug, Args)]
struct AddCatalogArgs {
    /// Product id as shown by `catalog`
    product: u32,

    /// Variant color
    #[arg(long)]
    color: String,

    /// Variant size
    #[arg(long)]
    size: String,

    /// Units
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

pub(crate) fn run<S: KeyValueStore>(
    storefront: &mut Storefront<S>,
    command: CartCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command.command {
        CartSubcommand::Show => {
            write_summary(out, &storefront.summary(), &storefront.contact())?;
        }
        CartSubcommand::AddCustom(args) => {
            let id = storefront.cart_mut().add_custom(NewCustomItem {
                garment_type: args.garment_type,
                material: args.material,
                color: args.color,
                design_ref: args.design,
                size: args.size,
                quantity: args.quantity,
                custom_text: args.text,
            });

            writeln!(out, "Línea {id} agregada")?;
        }
        CartSubcommand::AddCatalog(args) => {
            let product = storefront
                .catalog()
                .get(ProductId(args.product))
                .with_context(|| format!("product {} not found", args.product))?;

            ensure!(
                product.has_variant(&args.color, &args.size),
                "{} has no {} / {} variant",
                product.name,
                args.color,
                args.size
            );

            let id = storefront.add_catalog(
                ProductId(args.product),
                &args.color,
                &args.size,
                args.quantity,
            )?;

            writeln!(out, "Línea {id} agregada")?;
        }
        CartSubcommand::Remove { id } => {
            let id = CartItemId(id);

            match storefront.cart().find(id) {
                Some(LineItem::Custom(_)) => storefront.cart_mut().remove_custom(id),
                Some(LineItem::Catalog(_)) => storefront.cart_mut().remove_catalog(id),
                None => anyhow::bail!("cart line {id} not found"),
            }

            writeln!(out, "Línea {id} eliminada")?;
        }
        CartSubcommand::Qty { id, delta } => {
            let id = CartItemId(id);

            match storefront.cart().find(id) {
                Some(LineItem::Custom(line)) => {
                    let quantity = i64::from(line.quantity).saturating_add(delta).max(1);

                    storefront
                        .cart_mut()
                        .update_custom_quantity(id, u32::try_from(quantity).unwrap_or(u32::MAX));
                }
                Some(LineItem::Catalog(_)) => {
                    storefront.cart_mut().update_catalog_quantity(id, delta);
                }
                None => anyhow::bail!("cart line {id} not found"),
            }

            write_summary(out, &storefront.summary(), &storefront.contact())?;
        }
        CartSubcommand::Variant { id, color, size } => {
            let id = CartItemId(id);

            let Some(LineItem::Catalog(line)) = storefront.cart().find(id) else {
                anyhow::bail!("catalog line {id} not found");
            };

            let product = storefront
                .catalog()
                .get(line.product.id)
                .with_context(|| format!("product {} not found", line.product.id))?;

            ensure!(
                product.has_variant(&color, &size),
                "{} has no {color} / {size} variant",
                product.name
            );

            storefront.cart_mut().update_catalog_variant(id, &color, &size);

            write_summary(out, &storefront.summary(), &storefront.contact())?;
        }
        CartSubcommand::Clear { section } => {
            storefront.cart_mut().clear(section.into());

            writeln!(out, "Carrito vaciado")?;
        }
    }

    Ok(())
}

fn write_summary(
    out: &mut impl Write,
    summary: &Summary,
    contact: &StoreContact,
) -> anyhow::Result<()> {
    if summary.is_empty() {
        writeln!(out, "{EMPTY_CART_MESSAGE}")?;

        return Ok(());
    }

    let rows = summary.lines().iter().map(|line| {
        let origin = match line.source {
            LineSource::Custom => "personalizado",
            LineSource::Catalog => "catálogo",
        };

        let discount = if line.breakdown.has_discount {
            format!("{}%", line.breakdown.discount_percentage.normalize())
        } else {
            String::new()
        };

        [
            line.cart_item_id.to_string(),
            line.name.clone(),
            origin.to_string(),
            line.size.clone(),
            line.quantity.to_string(),
            contact.money(&line.breakdown.discounted_unit_price),
            discount,
            contact.money(&line.line_subtotal),
        ]
    });

    writeln!(
        out,
        "{}",
        table(
            [
                "Id", "Producto", "Origen", "Talla", "Cant.", "Unitario", "Dto.", "Subtotal",
            ],
            rows,
        )
    )?;

    let totals = summary.totals();

    if totals.tax.to_minor_units() > 0 {
        writeln!(out, "Subtotal: {}", contact.money(&totals.subtotal))?;
        writeln!(out, "Impuesto: {}", contact.money(&totals.tax))?;
    }

    if totals.savings.to_minor_units() > 0 {
        writeln!(out, "Ahorro: {}", contact.money(&totals.savings))?;
    }

    writeln!(out, "TOTAL: {}", contact.money(&totals.total))?;

    if !summary.skipped().is_empty() {
        writeln!(out, "{} línea(s) omitidas por datos incompletos", summary.skipped().len())?;
    }

    Ok(())
}
