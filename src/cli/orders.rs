use std::{fs, io::Write, path::PathBuf};

use anyhow::Context;
use atelier::{
    orders::{OrderId, OrderStatus},
    storage::KeyValueStore,
    storefront::Storefront,
};
use clap::{Args, Subcommand};
use jiff::Timestamp;

use super::table;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List every order, oldest first
    List,
    /// Change the status of an order
    Status {
        /// Order id
        id: OrderId,

        /// New status (pending, completed, cancelled)
        status: OrderStatus,
    },
    /// Aggregate statistics
    Stats,
    /// Orders and revenue within a time range
    Report {
        /// Start of the range, e.g. `2026-01-01T00:00:00Z`
        #[arg(long)]
        from: Timestamp,

        /// End of the range, inclusive
        #[arg(long)]
        to: Timestamp,
    },
    /// Export the order log as CSV
    Csv {
        /// Write to this file instead of standard output
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete an order
    Delete {
        /// Order id
        id: OrderId,
    },
}

pub(crate) fn run<S: KeyValueStore>(
    storefront: &mut Storefront<S>,
    command: OrdersCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command.command {
        OrdersSubcommand::List => {
            let orders = storefront.orders().orders();

            if orders.is_empty() {
                writeln!(out, "No hay pedidos")?;

                return Ok(());
            }

            let rows = orders.iter().map(|order| {
                [
                    order.id.to_string(),
                    order.created_at.strftime("%d/%m/%Y %H:%M").to_string(),
                    order.total().to_string(),
                    order.status.to_string(),
                    order.line_count().to_string(),
                ]
            });

            writeln!(out, "{}", table(["Id", "Fecha", "Total", "Estado", "Items"], rows))?;
        }
        OrdersSubcommand::Status { id, status } => {
            let order = storefront.orders_mut().set_status(id, status)?;

            writeln!(out, "Pedido {}: {}", order.id, order.status)?;
        }
        OrdersSubcommand::Stats => {
            let stats = storefront.orders().stats();

            let rows = [
                ("Pedidos", stats.total_orders.to_string()),
                ("Ingresos", stats.total_revenue.to_string()),
                ("Pendientes", stats.pending.to_string()),
                ("Completados", stats.completed.to_string()),
                ("Cancelados", stats.cancelled.to_string()),
                ("Ticket promedio", stats.average_order_value.to_string()),
                ("Tasa de completado", format!("{}%", stats.completion_rate)),
            ]
            .map(|(label, value)| [label.to_string(), value]);

            writeln!(out, "{}", table(["Métrica", "Valor"], rows))?;
        }
        OrdersSubcommand::Report { from, to } => {
            let report = storefront.orders().sales_report(from, to);

            writeln!(
                out,
                "{} pedido(s), ingresos {}, ticket promedio {}",
                report.total_orders, report.total_revenue, report.average_order_value
            )?;
        }
        OrdersSubcommand::Csv { output } => {
            let csv = storefront.orders().to_csv();

            match output {
                Some(path) => fs::write(&path, csv)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => writeln!(out, "{csv}")?,
            }
        }
        OrdersSubcommand::Delete { id } => {
            let order = storefront.orders_mut().delete(id)?;

            writeln!(out, "Pedido {} eliminado", order.id)?;
        }
    }

    Ok(())
}
