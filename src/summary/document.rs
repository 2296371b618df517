//! Order document
//!
//! Text body of the printable order: a header, a detail table and the store contact
//! block. Page layout and fonts belong to the document renderer.

use std::io;

use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::summary::{
    Summary, SummaryLine,
    message::{EMPTY_CART_MESSAGE, StoreContact, percent_label},
};

/// Errors that can occur when writing an order document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Render the order document for `summary` as text.
pub fn render_document(summary: &Summary, contact: &StoreContact, issued_at: Timestamp) -> String {
    let mut out = Vec::new();

    // Writing into a Vec cannot fail.
    _ = write_document(&mut out, summary, contact, issued_at);

    String::from_utf8_lossy(&out).into_owned()
}

/// Write the order document for `summary` to `out`.
///
/// # Errors
///
/// Returns [`DocumentError::IO`] if `out` cannot be written.
pub fn write_document(
    mut out: impl io::Write,
    summary: &Summary,
    contact: &StoreContact,
    issued_at: Timestamp,
) -> Result<(), DocumentError> {
    writeln!(out, "PEDIDO {}", contact.store_name).map_err(|_err| DocumentError::IO)?;
    writeln!(out, "Fecha: {}", issued_at.strftime("%d/%m/%Y %H:%M"))
        .map_err(|_err| DocumentError::IO)?;
    writeln!(out, "\nDETALLE DEL PEDIDO").map_err(|_err| DocumentError::IO)?;

    if summary.is_empty() {
        writeln!(out, "{EMPTY_CART_MESSAGE}").map_err(|_err| DocumentError::IO)?;
    } else {
        write_detail_table(&mut out, summary, contact)?;
        write_totals(&mut out, summary, contact)?;
    }

    write_contact(&mut out, contact)
}

fn write_detail_table(
    out: &mut impl io::Write,
    summary: &Summary,
    contact: &StoreContact,
) -> Result<(), DocumentError> {
    let mut builder = Builder::default();

    builder.push_record(["Descripción", "Cantidad", "Precio Unit.", "Subtotal"]);

    for line in summary.lines() {
        builder.push_record([
            describe(line),
            line.quantity.to_string(),
            contact.money(&line.breakdown.discounted_unit_price),
            contact.money(&line.line_subtotal),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..4), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "{table}").map_err(|_err| DocumentError::IO)
}

fn describe(line: &SummaryLine) -> String {
    let mut text = format!(
        "{}\nDiseño: {} | Talla: {}",
        line.name,
        line.design.as_deref().unwrap_or("N/A"),
        line.size
    );

    if !line.color.is_empty() {
        text.push_str(" | Color: ");
        text.push_str(&line.color);
    }

    if line.breakdown.has_discount {
        text.push_str("\n✓ ");
        text.push_str(&percent_label(line.breakdown.discount_percentage));
        text.push_str("% OFF");
    }

    text
}

fn write_totals(
    out: &mut impl io::Write,
    summary: &Summary,
    contact: &StoreContact,
) -> Result<(), DocumentError> {
    let totals = summary.totals();

    if totals.tax.to_minor_units() > 0 {
        writeln!(out, "Subtotal: {}", contact.money(&totals.subtotal))
            .map_err(|_err| DocumentError::IO)?;
        writeln!(out, "Impuesto: {}", contact.money(&totals.tax))
            .map_err(|_err| DocumentError::IO)?;
    }

    writeln!(out, "TOTAL: {}", contact.money(&totals.total)).map_err(|_err| DocumentError::IO)
}

fn write_contact(out: &mut impl io::Write, contact: &StoreContact) -> Result<(), DocumentError> {
    writeln!(
        out,
        "\nINFORMACIÓN DE CONTACTO\n📍 {}\n{}\n📞 WhatsApp: {}\n⏰ Horario: {}",
        contact.address, contact.city, contact.whatsapp, contact.hours
    )
    .map_err(|_err| DocumentError::IO)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        items::{CartItemId, CustomLineItem, LineItem},
        pricing::{PriceCalculator, rules::PricingRules},
        summary::build_summary,
    };

    use super::*;

    fn custom_line(quantity: u32) -> CustomLineItem {
        CustomLineItem {
            cart_item_id: CartItemId(1),
            garment_type: "polera".to_string(),
            material: "Algodon".to_string(),
            color: "negro".to_string(),
            design_ref: "imagenes/Estampado/EST_IMG3.png".to_string(),
            size: "L".to_string(),
            quantity,
            custom_text: None,
            added_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn document_has_header_rows_and_total() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);
        let line = custom_line(12);

        let summary = build_summary([LineItem::Custom(&line)], &calculator, Decimal::ZERO);
        let document = render_document(&summary, &StoreContact::default(), Timestamp::UNIX_EPOCH);

        assert!(document.starts_with("PEDIDO YOLIMAR\nFecha: 01/01/1970 00:00\n"));
        assert!(document.contains("Descripción"));
        assert!(document.contains("Precio Unit."));
        assert!(document.contains("Diseño: EST_IMG3 | Talla: L | Color: negro"));
        assert!(document.contains("✓ 5% OFF"));
        assert!(document.contains("Bs 57.00"));
        assert!(document.contains("TOTAL: Bs 684.00"));
        assert!(document.contains("📞 WhatsApp: +591 76319999"));
    }

    #[test]
    fn document_for_empty_summary_has_no_table() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);

        let summary = build_summary([], &calculator, Decimal::ZERO);
        let document = render_document(&summary, &StoreContact::default(), Timestamp::UNIX_EPOCH);

        assert!(document.contains(EMPTY_CART_MESSAGE));
        assert!(!document.contains("Precio Unit."));
    }

    #[test]
    fn write_document_reports_io_failure() {
        struct Broken;

        impl io::Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);
        let summary = build_summary([], &calculator, Decimal::ZERO);

        let result = write_document(
            Broken,
            &summary,
            &StoreContact::default(),
            Timestamp::UNIX_EPOCH,
        );

        assert!(matches!(result, Err(DocumentError::IO)));
    }
}
