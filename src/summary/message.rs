//! Order message
//!
//! The plain-text order forwarded to the store's `WhatsApp` contact.

use std::fmt::Write;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    prices::{Price, format_amount},
    summary::Summary,
};

/// Text sent instead of an order when nothing can be ordered.
pub const EMPTY_CART_MESSAGE: &str = "Tu carrito está vacío";

/// Store contact block printed in the message and the order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreContact {
    /// Person greeted at the top of the message
    pub owner: String,

    /// Store name used in document headers
    pub store_name: String,

    /// Street address
    pub address: String,

    /// City and country
    pub city: String,

    /// `WhatsApp` number in international format
    pub whatsapp: String,

    /// Opening days and hours
    pub hours: String,

    /// Label printed before amounts
    pub currency_label: String,
}

impl Default for StoreContact {
    fn default() -> Self {
        Self {
            owner: "Yolimar".to_string(),
            store_name: "YOLIMAR".to_string(),
            address: "Feria Barrio Lindo Pasillo Potosi Puesto NRO. 1038".to_string(),
            city: "Santa Cruz de la Sierra, Bolivia".to_string(),
            whatsapp: "+591 76319999".to_string(),
            hours: "Miércoles y Sábado: 5:00 - 18:00".to_string(),
            currency_label: "Bs".to_string(),
        }
    }
}

impl StoreContact {
    /// Amount with the currency label, e.g. `Bs 49.50`.
    pub fn money(&self, price: &Price) -> String {
        format!("{} {}", self.currency_label, format_amount(price))
    }
}

/// Percent points without trailing zeros, e.g. `10` or `12.5`.
pub(crate) fn percent_label(points: Decimal) -> String {
    points.normalize().to_string()
}

/// Render the order message for `summary`.
///
/// The output is a pure function of its inputs.
pub fn render_message(summary: &Summary, contact: &StoreContact) -> String {
    if summary.is_empty() {
        return EMPTY_CART_MESSAGE.to_string();
    }

    let mut message = format!("*Hola {}!* He generado un nuevo pedido:\n\n", contact.owner);

    for line in summary.lines() {
        _ = writeln!(message, "{}. {}", line.number, line.name);

        if let Some(design) = &line.design {
            _ = writeln!(message, "   - Diseño: {design}");
        }

        _ = write!(
            message,
            "   - Cantidad: {} x {}",
            line.quantity,
            contact.money(&line.breakdown.discounted_unit_price)
        );

        if line.breakdown.has_discount {
            _ = write!(
                message,
                " (con {}% descuento)",
                percent_label(line.breakdown.discount_percentage)
            );
        }

        _ = write!(message, " = {}\n\n", contact.money(&line.line_subtotal));
    }

    let totals = summary.totals();

    if totals.tax.to_minor_units() > 0 {
        _ = write!(
            message,
            "\nSubtotal: {}\nIGV ({}%): {}",
            contact.money(&totals.subtotal),
            percent_label(summary.tax_rate() * Decimal::ONE_HUNDRED),
            contact.money(&totals.tax)
        );
    }

    _ = write!(message, "\n*TOTAL: {}*", contact.money(&totals.total));
    _ = write!(message, "\n\n📍 {}", contact.address);
    _ = write!(message, "\n⏰ {}", contact.hours);
    message.push_str("\n\n✅ He descargado el PDF del pedido");

    message
}
