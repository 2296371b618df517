//! Order statistics and sales reports

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::orders::{Order, OrderStatus};

/// Aggregates over the whole order log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    /// Number of orders
    pub total_orders: usize,

    /// Sum of order totals, regardless of status
    pub total_revenue: Decimal,

    /// Orders awaiting fulfilment
    pub pending: usize,

    /// Fulfilled orders
    pub completed: usize,

    /// Abandoned orders
    pub cancelled: usize,

    /// `total_revenue / total_orders`, zero without orders
    pub average_order_value: Decimal,

    /// Completed orders as a percentage of all orders, zero without orders
    pub completion_rate: Decimal,
}

impl OrderStats {
    /// Compute statistics over `orders`.
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status: OrderStatus| {
            orders.iter().filter(|order| order.status == status).count()
        };

        let total_orders = orders.len();
        let total_revenue = revenue(orders);
        let completed = count(OrderStatus::Completed);

        Self {
            total_orders,
            total_revenue,
            pending: count(OrderStatus::Pending),
            completed,
            cancelled: count(OrderStatus::Cancelled),
            average_order_value: ratio(total_revenue, total_orders),
            completion_rate: ratio(
                Decimal::from(completed) * Decimal::ONE_HUNDRED,
                total_orders,
            ),
        }
    }
}

/// Orders created within a time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    /// Start of the range, inclusive
    pub from: Timestamp,

    /// End of the range, inclusive
    pub to: Timestamp,

    /// Number of orders in range
    pub total_orders: usize,

    /// Sum of their totals
    pub total_revenue: Decimal,

    /// `total_revenue / total_orders`, zero without orders
    pub average_order_value: Decimal,

    /// The orders in range, oldest first
    pub orders: Vec<Order>,
}

impl SalesReport {
    /// Build a report over the orders created within `from..=to`.
    pub fn new(orders: &[Order], from: Timestamp, to: Timestamp) -> Self {
        let orders: Vec<Order> = orders
            .iter()
            .filter(|order| order.created_at >= from && order.created_at <= to)
            .cloned()
            .collect();

        let total_revenue = revenue(&orders);

        Self {
            from,
            to,
            total_orders: orders.len(),
            total_revenue,
            average_order_value: ratio(total_revenue, orders.len()),
            orders,
        }
    }
}

fn revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .fold(Decimal::ZERO, |sum, order| sum.saturating_add(order.total()))
}

/// `amount / count` to two places, or zero when `count` is zero.
fn ratio(amount: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }

    amount
        .checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
