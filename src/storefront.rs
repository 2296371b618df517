//! Storefront
//!
//! Owns the pricing rules, catalog, cart, order log and settings over one shared store.

use std::rc::Rc;

use jiff::Timestamp;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartError, CartSection, CartSnapshot},
    items::CartItemId,
    orders::{Order, OrderError, OrderLog},
    pricing::{PriceCalculator, rules::PricingRules},
    products::{Catalog, ProductId},
    settings::Settings,
    storage::KeyValueStore,
    summary::{StoreContact, Summary, render_document, render_message},
};

/// Errors raised by storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// No catalog product has this id.
    #[error("product {0} not found")]
    UnknownProduct(u32),

    /// The cart cannot be checked out.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The order could not be recorded.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    /// The recorded order
    pub order: Order,

    /// Order message for the store's `WhatsApp` contact
    pub message: String,

    /// Text body of the order document
    pub document: String,
}

/// A storefront over a single key-value store.
#[derive(Debug)]
pub struct Storefront<S> {
    rules: PricingRules,
    catalog: Catalog,
    cart: Cart<Rc<S>>,
    orders: OrderLog<Rc<S>>,
    settings: Settings<Rc<S>>,
}

impl<S: KeyValueStore> Storefront<S> {
    /// Open a storefront with the built-in rules and catalog.
    pub fn open(store: S) -> Self {
        Self::with_rules(store, PricingRules::builtin(), Catalog::builtin())
    }

    /// Open a storefront with the given rules and catalog.
    pub fn with_rules(store: S, rules: PricingRules, catalog: Catalog) -> Self {
        let store = Rc::new(store);

        Self {
            rules,
            catalog,
            cart: Cart::load(Rc::clone(&store)),
            orders: OrderLog::load(Rc::clone(&store)),
            settings: Settings::load(store),
        }
    }

    /// Pricing rules in use.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Product catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Calculator over the storefront's rules.
    pub fn calculator(&self) -> PriceCalculator<'_> {
        PriceCalculator::new(&self.rules)
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<Rc<S>> {
        &self.cart
    }

    /// The cart, for mutation.
    pub fn cart_mut(&mut self) -> &mut Cart<Rc<S>> {
        &mut self.cart
    }

    /// The order log.
    pub fn orders(&self) -> &OrderLog<Rc<S>> {
        &self.orders
    }

    /// The order log, for administration.
    pub fn orders_mut(&mut self) -> &mut OrderLog<Rc<S>> {
        &mut self.orders
    }

    /// Store settings.
    pub fn settings(&self) -> &Settings<Rc<S>> {
        &self.settings
    }

    /// Store settings, for updates.
    pub fn settings_mut(&mut self) -> &mut Settings<Rc<S>> {
        &mut self.settings
    }

    /// Contact block with the configured store name and currency label.
    pub fn contact(&self) -> StoreContact {
        let settings = self.settings.get();

        StoreContact {
            store_name: settings.store_name.clone(),
            currency_label: settings.currency.clone(),
            ..StoreContact::default()
        }
    }

    /// Add a catalog product by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::UnknownProduct`] if the catalog has no such product.
    pub fn add_catalog(
        &mut self,
        product: ProductId,
        color: &str,
        size: &str,
        quantity: u32,
    ) -> Result<CartItemId, StorefrontError> {
        let product = self
            .catalog
            .get(product)
            .ok_or(StorefrontError::UnknownProduct(product.0))?;

        Ok(self.cart.add_catalog(product, color, size, quantity))
    }

    /// Summary of the cart at the configured tax rate.
    pub fn summary(&self) -> Summary {
        self.cart
            .summary(&self.calculator(), self.settings.get().tax_rate)
    }

    /// Cart contents with totals at the configured tax rate.
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart
            .snapshot(&self.calculator(), self.settings.get().tax_rate)
    }

    /// Check out the cart now.
    ///
    /// # Errors
    ///
    /// See [`Storefront::checkout_at`].
    pub fn checkout(&mut self) -> Result<Checkout, StorefrontError> {
        self.checkout_at(Timestamp::now())
    }

    /// Record the cart as an order created at `at`, then empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Cart`] for an empty cart, or [`StorefrontError::Order`]
    /// if the order cannot be recorded. The cart is kept on error.
    pub fn checkout_at(&mut self, at: Timestamp) -> Result<Checkout, StorefrontError> {
        self.cart.validate()?;

        let summary = self.summary();
        let contact = self.contact();

        let order = self.orders.commit_at(&summary, at)?;

        let message = render_message(&summary, &contact);
        let document = render_document(&summary, &contact, at);

        self.cart.clear(CartSection::All);

        info!(id = %order.id, lines = order.line_count(), "checkout complete");

        Ok(Checkout {
            order,
            message,
            document,
        })
    }
}
