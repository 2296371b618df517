//! Atelier prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartSection, CartSnapshot},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    items::{CartItemId, CatalogLineItem, CustomLineItem, LineItem, NewCustomItem},
    orders::{Order, OrderError, OrderId, OrderLog, OrderStats, OrderStatus, SalesReport},
    prices::{Price, PriceError},
    pricing::{
        PriceBreakdown, PriceCalculator, PriceComparison,
        rules::{DiscountRule, GarmentRules, PricingRules, PricingRulesError, SizeGroup},
    },
    products::{Catalog, Product, ProductId, ProductRef, Variant},
    settings::{Settings, SettingsError, SettingsPatch, StoreSettings, Theme},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    storefront::{Checkout, Storefront, StorefrontError},
    summary::{
        StoreContact, Summary, SummaryExport, SummaryLine, SummaryTotals, build_summary,
        render_document, render_message,
    },
};
