//! Integration test for a full storefront session over the file store.
//!
//! A shopper adds two custom poleras (12 units, custom discount 5%) and five catalog
//! poleras in size M (catalog discount 10% from 3 units), checks out with the default settings, and
//! the order is reloaded from disk by a fresh storefront.
//!
//! - Custom: 60.00 -> 57.00 x 12 = 684.00, saves 36.00
//! - Catalog: 55.00 -> 49.50 x 5 = 247.50, saves 27.50
//! - Total: 931.50

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;

use atelier::{
    items::NewCustomItem,
    orders::OrderStatus,
    prelude::*,
    storage::keys,
    summary::{LineSource, SummaryExport},
};

fn custom_polera(quantity: u32) -> NewCustomItem {
    NewCustomItem {
        garment_type: "polera".to_string(),
        material: "Algodon".to_string(),
        color: "negro".to_string(),
        design_ref: "imagenes/Estampado/EST_IMG3.png".to_string(),
        size: "L".to_string(),
        quantity,
        custom_text: Some("ATELIER".to_string()),
    }
}

#[test]
fn checkout_persists_order_across_sessions() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut storefront = Storefront::open(FileStore::open(dir.path())?);

    storefront.cart_mut().add_custom(custom_polera(12));
    storefront.add_catalog(ProductId(1), "blanco", "M", 3)?;
    storefront.add_catalog(ProductId(1), "blanco", "M", 2)?;

    assert_eq!(storefront.cart().item_count(), 2);
    assert_eq!(storefront.cart().total_items(), 17);

    let summary = storefront.summary();
    let sources: Vec<LineSource> = summary.lines().iter().map(|line| line.source).collect();

    assert_eq!(sources, [LineSource::Custom, LineSource::Catalog]);
    assert_eq!(summary.totals().savings.to_minor_units(), 6350);

    let checkout = storefront.checkout_at(Timestamp::UNIX_EPOCH)?;

    assert_eq!(checkout.order.total(), Decimal::new(93_150, 2));
    assert!(checkout.message.starts_with("*Hola Yolimar!*"));
    assert!(checkout.message.contains("   - Diseño: EST_IMG3"));
    assert!(checkout.message.contains("(con 5% descuento) = Bs 684.00"));
    assert!(checkout.message.contains("(con 10% descuento) = Bs 247.50"));
    assert!(checkout.document.contains("TOTAL: Bs 931.50"));

    drop(storefront);

    let reopened = Storefront::open(FileStore::open(dir.path())?);

    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.orders().len(), 1);

    let order = reopened
        .orders()
        .get(checkout.order.id)
        .ok_or("order not reloaded")?;

    assert_eq!(order, &checkout.order);
    assert!(dir.path().join(format!("{}.json", keys::ORDERS)).is_file());

    Ok(())
}

#[test]
fn order_lifecycle_and_statistics() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut storefront = Storefront::open(FileStore::open(dir.path())?);

    storefront.add_catalog(ProductId(1), "blanco", "M", 5)?;
    let first = storefront.checkout()?.order;

    storefront.cart_mut().add_custom(custom_polera(1));
    let second = storefront.checkout()?.order;

    storefront
        .orders_mut()
        .set_status(first.id, OrderStatus::Completed)?;

    let stats = storefront.orders().stats();

    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total_revenue, Decimal::new(30_750, 2));
    assert_eq!(stats.completion_rate, Decimal::new(5000, 2));

    storefront.orders_mut().delete(second.id)?;

    let reopened = Storefront::open(FileStore::open(dir.path())?);
    let remaining = reopened.orders().orders();

    assert_eq!(remaining.len(), 1);
    assert_eq!(
        remaining.first().map(|order| order.status),
        Some(OrderStatus::Completed)
    );
    assert!(remaining.first().is_some_and(|order| order.updated_at.is_some()));

    Ok(())
}

#[test]
fn summary_export_carries_both_collections() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut storefront = Storefront::open(FileStore::open(dir.path())?);
    storefront.settings_mut().update(SettingsPatch {
        tax_rate: Some(Decimal::new(18, 2)),
        ..SettingsPatch::default()
    })?;

    storefront.cart_mut().add_custom(custom_polera(2));
    storefront.add_catalog(ProductId(1), "negro", "S", 1)?;

    let export = SummaryExport::new(&storefront.summary(), Timestamp::UNIX_EPOCH);
    let json: serde_json::Value = serde_json::from_str(&export.to_json()?)?;

    assert_eq!(json["custom_items"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["catalog_items"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["totals"]["subtotal"], "175.00");
    assert_eq!(json["totals"]["tax"], "31.50");
    assert_eq!(json["totals"]["total"], "206.50");
    assert_eq!(json["totals"]["item_count"], 3);

    Ok(())
}
