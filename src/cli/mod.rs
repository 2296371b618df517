use std::io::Write;

use clap::{Parser, Subcommand};
use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Style, object::Rows},
};

use crate::config::{LoggingConfig, StoreConfig};

mod cart;
mod catalog;
mod checkout;
mod orders;
mod quote;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "atelier", about = "Atelier storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) store: StoreConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a line without touching the cart
    Quote(quote::QuoteArgs),
    /// Inspect and edit the cart
    Cart(cart::CartCommand),
    /// Record the cart as an order
    Checkout(checkout::CheckoutArgs),
    /// Administer recorded orders
    Orders(orders::OrdersCommand),
    /// Show or change store settings
    Settings(settings::SettingsCommand),
    /// List catalog products
    Catalog,
}

impl Cli {
    /// Parse arguments, reading `.env` first when present.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self, out: &mut impl Write) -> anyhow::Result<()> {
        let mut storefront = self.store.open()?;

        match self.command {
            Commands::Quote(args) => quote::run(&storefront, args, out),
            Commands::Cart(command) => cart::run(&mut storefront, command, out),
            Commands::Checkout(args) => checkout::run(&mut storefront, args, out),
            Commands::Orders(command) => orders::run(&mut storefront, command, out),
            Commands::Settings(command) => settings::run(&mut storefront, command, out),
            Commands::Catalog => catalog::run(&storefront, out),
        }
    }
}

/// Rounded table with a centered header row.
fn table<R, C>(header: impl IntoIterator<Item = &'static str>, rows: R) -> Table
where
    R: IntoIterator<Item = C>,
    C: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();

    builder.push_record(header);

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Alignment::center());

    table
}
