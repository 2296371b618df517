//! Orders
//!
//! Append-only log of checked-out summaries. Every change rewrites the whole log under
//! [`keys::ORDERS`] and is only kept in memory once the write succeeded.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    storage::{KeyValueStore, StorageError, keys, load_or_default, save_json},
    summary::{ExportedLine, ExportedTotals, Summary, SummaryExport},
};

mod csv;
mod stats;

pub use csv::orders_csv;
pub use stats::{OrderStats, SalesReport};

/// Errors raised by the order log.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The summary has no lines.
    #[error("cannot record an order without lines")]
    Empty,

    /// No order has the given id.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// Unrecognised status name.
    #[error("unknown order status: {0}")]
    InvalidStatus(String),

    /// Malformed order id.
    #[error("invalid order id: {0}")]
    InvalidId(String),

    /// The log could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Order identifier, a time-ordered UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// A fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_err| OrderError::InvalidId(s.to_string()))
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting fulfilment
    #[default]
    Pending,
    /// Delivered and paid
    Completed,
    /// Abandoned
    Cancelled,
}

impl OrderStatus {
    /// Lowercase status name.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(OrderError::InvalidStatus(s.to_string())),
        }
    }
}

/// A recorded order. Lines and totals are frozen at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: OrderId,

    /// Priced lines, custom lines first
    pub items: Vec<ExportedLine>,

    /// Amounts at commit time
    pub totals: ExportedTotals,

    /// ISO code of every amount
    pub currency: String,

    /// Lifecycle status
    pub status: OrderStatus,

    /// When the order was recorded
    pub created_at: Timestamp,

    /// Last status change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Order {
    /// Amount due.
    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

/// The persisted order log.
#[derive(Debug)]
pub struct OrderLog<S> {
    store: S,
    orders: Vec<Order>,
}

impl<S: KeyValueStore> OrderLog<S> {
    /// Load the log from `store`; an unreadable log starts empty.
    pub fn load(store: S) -> Self {
        let orders: Vec<Order> = load_or_default(&store, keys::ORDERS);

        debug!(orders = orders.len(), "order log loaded");

        Self { store, orders }
    }

    /// Record `summary` as a new pending order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Empty`] if the summary has no lines, or
    /// [`OrderError::Storage`] if the log cannot be persisted. The log is unchanged on
    /// error.
    pub fn commit(&mut self, summary: &Summary) -> Result<Order, OrderError> {
        self.commit_at(summary, Timestamp::now())
    }

    /// Record `summary` as a new pending order created at `created_at`.
    ///
    /// # Errors
    ///
    /// Same as [`OrderLog::commit`].
    pub fn commit_at(
        &mut self,
        summary: &Summary,
        created_at: Timestamp,
    ) -> Result<Order, OrderError> {
        if summary.is_empty() {
            return Err(OrderError::Empty);
        }

        let export = SummaryExport::new(summary, created_at);

        let order = Order {
            id: OrderId::new(),
            items: export.lines().cloned().collect(),
            totals: export.totals,
            currency: export.currency,
            status: OrderStatus::Pending,
            created_at,
            updated_at: None,
        };

        self.orders.push(order.clone());

        if let Err(err) = self.persist() {
            self.orders.pop();

            return Err(err);
        }

        info!(id = %order.id, total = %order.total(), "order recorded");

        Ok(order)
    }

    /// Change the status of an order. Any transition is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for an unknown id, or [`OrderError::Storage`] if
    /// the log cannot be persisted, in which case the order keeps its previous status.
    pub fn set_status(&mut self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(OrderError::NotFound(id))?;

        let previous = (order.status, order.updated_at);

        order.status = status;
        order.updated_at = Some(Timestamp::now());

        let updated = order.clone();

        if let Err(err) = self.persist() {
            if let Some(order) = self.orders.iter_mut().find(|order| order.id == id) {
                (order.status, order.updated_at) = previous;
            }

            return Err(err);
        }

        info!(%id, %status, "order status changed");

        Ok(updated)
    }

    /// Remove an order from the log.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] for an unknown id, or [`OrderError::Storage`] if
    /// the log cannot be persisted, in which case the order is kept.
    pub fn delete(&mut self, id: OrderId) -> Result<Order, OrderError> {
        let position = self
            .orders
            .iter()
            .position(|order| order.id == id)
            .ok_or(OrderError::NotFound(id))?;

        let removed = self.orders.remove(position);

        if let Err(err) = self.persist() {
            self.orders.insert(position, removed);

            return Err(err);
        }

        info!(%id, "order deleted");

        Ok(removed)
    }

    /// Look up an order.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }

    /// Every order, oldest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the log has no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Aggregate statistics over every order.
    pub fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.orders)
    }

    /// Orders created within `from..=to`, with their revenue.
    pub fn sales_report(&self, from: Timestamp, to: Timestamp) -> SalesReport {
        SalesReport::new(&self.orders, from, to)
    }

    /// CSV listing of every order; empty when there are none.
    pub fn to_csv(&self) -> String {
        orders_csv(&self.orders)
    }

    fn persist(&self) -> Result<(), OrderError> {
        save_json(&self.store, keys::ORDERS, &self.orders)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        items::{CartItemId, CatalogLineItem, LineItem},
        pricing::{PriceCalculator, rules::PricingRules},
        products::{ProductId, ProductRef},
        storage::{MemoryStore, MockKeyValueStore},
        summary::build_summary,
    };

    use super::*;

    fn line(quantity: u32) -> CatalogLineItem {
        CatalogLineItem {
            cart_item_id: CartItemId(1),
            product: ProductRef {
                id: ProductId(3),
                name: "Saco Elegante".to_string(),
                garment_type: "saco".to_string(),
            },
            selected_color: "negro".to_string(),
            selected_size: "M".to_string(),
            quantity,
            added_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn summary(quantity: u32) -> Summary {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);
        let line = line(quantity);

        build_summary([LineItem::Catalog(&line)], &calculator, Decimal::ZERO)
    }

    #[test]
    fn commit_appends_pending_order() -> TestResult {
        let mut log = OrderLog::load(MemoryStore::new());

        let order = log.commit(&summary(1))?;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total(), Decimal::new(18_900, 2));
        assert_eq!(order.currency, "BOB");
        assert!(order.updated_at.is_none());
        assert_eq!(log.orders(), [order]);

        Ok(())
    }

    #[test]
    fn commit_never_reorders_existing_orders() -> TestResult {
        let mut log = OrderLog::load(MemoryStore::new());

        let first = log.commit(&summary(1))?;
        let second = log.commit(&summary(2))?;

        assert_ne!(first.id, second.id);
        assert_eq!(log.orders(), [first, second]);

        Ok(())
    }

    #[test]
    fn commit_rejects_empty_summary() {
        let rules = PricingRules::builtin();
        let calculator = PriceCalculator::new(&rules);
        let mut log = OrderLog::load(MemoryStore::new());

        let result = log.commit(&build_summary([], &calculator, Decimal::ZERO));

        assert!(matches!(result, Err(OrderError::Empty)));
        assert!(log.is_empty());
    }

    #[test]
    fn commit_surfaces_storage_failure_and_keeps_log_unchanged() {
        let mut store = MockKeyValueStore::new();

        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .once()
            .withf(|key, _| key == keys::ORDERS)
            .returning(|_, _| Err(StorageError::Unavailable("disk full".to_string())));

        let mut log = OrderLog::load(store);

        let result = log.commit(&summary(1));

        assert!(matches!(
            result,
            Err(OrderError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn orders_survive_reload() -> TestResult {
        let store = MemoryStore::new();

        let order = OrderLog::load(&store).commit(&summary(3))?;
        let reloaded = OrderLog::load(&store);

        assert_eq!(reloaded.get(order.id), Some(&order));

        Ok(())
    }

    #[test]
    fn set_status_allows_any_transition_and_stamps_update() -> TestResult {
        let mut log = OrderLog::load(MemoryStore::new());
        let order = log.commit(&summary(1))?;

        let completed = log.set_status(order.id, OrderStatus::Completed)?;
        let reopened = log.set_status(order.id, OrderStatus::Pending)?;

        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(reopened.status, OrderStatus::Pending);
        assert!(reopened.updated_at.is_some());

        Ok(())
    }

    #[test]
    fn set_status_reverts_on_storage_failure() -> TestResult {
        let store = MemoryStore::new();
        let order = OrderLog::load(&store).commit(&summary(1))?;
        let raw = store.get(keys::ORDERS)?;

        let mut failing = MockKeyValueStore::new();
        failing.expect_get().returning(move |_| Ok(raw.clone()));
        failing
            .expect_set()
            .returning(|_, _| Err(StorageError::Unavailable("read-only".to_string())));

        let mut log = OrderLog::load(failing);
        let result = log.set_status(order.id, OrderStatus::Cancelled);

        assert!(result.is_err());
        assert_eq!(log.get(order.id), Some(&order));

        Ok(())
    }

    #[test]
    fn set_status_rejects_unknown_order() {
        let mut log = OrderLog::load(MemoryStore::new());

        let result = log.set_status(OrderId::new(), OrderStatus::Completed);

        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }

    #[test]
    fn delete_removes_order() -> TestResult {
        let mut log = OrderLog::load(MemoryStore::new());
        let keep = log.commit(&summary(1))?;
        let dropped = log.commit(&summary(2))?;

        let removed = log.delete(dropped.id)?;

        assert_eq!(removed.id, dropped.id);
        assert_eq!(log.orders(), [keep]);

        Ok(())
    }

    #[test]
    fn status_parses_case_insensitively() -> TestResult {
        assert_eq!("Completed".parse::<OrderStatus>()?, OrderStatus::Completed);
        assert_eq!("canceled".parse::<OrderStatus>()?, OrderStatus::Cancelled);
        assert!("shipped".parse::<OrderStatus>().is_err());

        Ok(())
    }

    #[test]
    fn order_id_round_trips_through_display() -> TestResult {
        let id = OrderId::new();

        assert_eq!(id.to_string().parse::<OrderId>()?, id);
        assert!(matches!(
            "not-a-uuid".parse::<OrderId>(),
            Err(OrderError::InvalidId(_))
        ));

        Ok(())
    }
}
