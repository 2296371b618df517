use std::{fs, io::Write, path::PathBuf};

use anyhow::Context;
use atelier::{storage::KeyValueStore, storefront::Storefront};
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Write the order document to this file
    #[arg(long)]
    document: Option<PathBuf>,

    /// Print the recorded order as JSON instead of the message
    #[arg(long)]
    json: bool,
}

pub(crate) fn run<S: KeyValueStore>(
    storefront: &mut Storefront<S>,
    args: CheckoutArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let checkout = storefront.checkout()?;

    if let Some(path) = args.document {
        fs::write(&path, &checkout.document)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&checkout.order)?)?;
    } else {
        writeln!(out, "{}", checkout.message)?;
        writeln!(out, "\nPedido {} registrado", checkout.order.id)?;
    }

    Ok(())
}
