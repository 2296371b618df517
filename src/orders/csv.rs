//! CSV export of the order log

use crate::orders::Order;

/// Header row of the order CSV.
pub const CSV_HEADER: [&str; 5] = ["ID", "Fecha", "Total", "Estado", "Items"];

/// Render `orders` as CSV with every cell quoted.
///
/// Returns an empty string when there are no orders.
pub fn orders_csv(orders: &[Order]) -> String {
    if orders.is_empty() {
        return String::new();
    }

    let header = std::iter::once(CSV_HEADER.map(str::to_string));

    let rows = orders.iter().map(|order| {
        [
            order.id.to_string(),
            order.created_at.to_string(),
            order.total().to_string(),
            order.status.to_string(),
            order.line_count().to_string(),
        ]
    });

    header
        .chain(rows)
        .map(|row| {
            row.iter()
                .map(|cell| quote(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
