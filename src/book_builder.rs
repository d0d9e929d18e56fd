//! Per-order state built from incremental updates
//!
//! Every Execute, Cancel and Replace is resolved against the order an earlier
//! Add created. Orders are never removed: an exhausted order keeps its entry
//! with `remaining == 0` so later messages against it still resolve.

use crate::decoder::Message;
use crate::protocol::{normalize_ticker, TICKER_LEN};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("order ref was not found: {0}")]
    OrderNotFound(u64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    /// ASCII ticker with spaces replaced by NUL
    pub ticker: [u8; TICKER_LEN],
    pub price: f64,
    pub remaining: u32,
}

impl Order {
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// What a message did to the book
///
/// Carries every field of the output record except the timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookUpdate {
    Added {
        ticker: [u8; TICKER_LEN],
        order_ref: u64,
        side: u8,
        size: u32,
        price: f64,
    },
    Executed {
        ticker: [u8; TICKER_LEN],
        order_ref: u64,
        executed: u32,
        price: f64,
        remaining: u32,
    },
    Reduced {
        ticker: [u8; TICKER_LEN],
        order_ref: u64,
        remaining: u32,
    },
    Replaced {
        ticker: [u8; TICKER_LEN],
        old_order_ref: u64,
        new_order_ref: u64,
        size: u32,
        price: f64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: HashMap<u64, Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        OrderBook {
            orders: HashMap::new(),
        }
    }

    /// Apply a decoded message to the book
    ///
    /// Lookups happen before any mutation, so a failed message leaves the
    /// book untouched.
    pub fn apply_message(&mut self, msg: &Message) -> Result<BookUpdate, BookError> {
        match *msg {
            Message::AddOrder {
                order_ref,
                side,
                size,
                ticker,
                price,
                ..
            } => {
                let order = self.add(order_ref, ticker, price, size);
                Ok(BookUpdate::Added {
                    ticker: order.ticker,
                    order_ref,
                    side,
                    size,
                    price,
                })
            }
            Message::OrderExecuted { order_ref, size, .. } => {
                let (executed, order) = self.execute(order_ref, size)?;
                Ok(BookUpdate::Executed {
                    ticker: order.ticker,
                    order_ref,
                    executed,
                    price: order.price,
                    remaining: order.remaining,
                })
            }
            Message::OrderCancelled { order_ref, size, .. } => {
                let order = self.reduce(order_ref, size)?;
                Ok(BookUpdate::Reduced {
                    ticker: order.ticker,
                    order_ref,
                    remaining: order.remaining,
                })
            }
            Message::OrderReplaced {
                old_order_ref,
                new_order_ref,
                size,
                price,
                ..
            } => {
                let ticker = self.replace(old_order_ref, new_order_ref, size, price)?;
                Ok(BookUpdate::Replaced {
                    ticker,
                    old_order_ref,
                    new_order_ref,
                    size,
                    price,
                })
            }
        }
    }

    /// Insert a new order from an Add, normalizing its ticker
    pub fn add(&mut self, order_ref: u64, ticker: [u8; TICKER_LEN], price: f64, size: u32) -> Order {
        let order = Order {
            ticker: normalize_ticker(ticker),
            price,
            remaining: size,
        };
        self.insert(order_ref, order);
        order
    }

    /// Execute up to `size` against an order, never more than it has remaining
    ///
    /// Returns the executed quantity and the order after the fill.
    pub fn execute(&mut self, order_ref: u64, size: u32) -> Result<(u32, Order), BookError> {
        let order = self.lookup_mut(order_ref)?;
        let executed = size.min(order.remaining);
        order.remaining -= executed;
        Ok((executed, *order))
    }

    /// Cancel `size` from an order, clamping at zero; returns the updated order
    pub fn reduce(&mut self, order_ref: u64, size: u32) -> Result<Order, BookError> {
        let order = self.lookup_mut(order_ref)?;
        order.remaining = order.remaining.saturating_sub(size);
        Ok(*order)
    }

    /// Retire `old_ref` and seed `new_ref` with its ticker; returns that ticker
    pub fn replace(
        &mut self,
        old_ref: u64,
        new_ref: u64,
        size: u32,
        price: f64,
    ) -> Result<[u8; TICKER_LEN], BookError> {
        let old = self.lookup_mut(old_ref)?;
        old.remaining = 0;
        let ticker = old.ticker;

        self.insert(
            new_ref,
            Order {
                ticker,
                price,
                remaining: size,
            },
        );
        Ok(ticker)
    }

    fn insert(&mut self, order_ref: u64, order: Order) {
        if let Some(previous) = self.orders.insert(order_ref, order) {
            if !previous.is_exhausted() {
                warn!(
                    order_ref,
                    remaining = previous.remaining,
                    "overwrote live order with a new add"
                );
            }
        }
    }

    fn lookup_mut(&mut self, order_ref: u64) -> Result<&mut Order, BookError> {
        self.orders
            .get_mut(&order_ref)
            .ok_or(BookError::OrderNotFound(order_ref))
    }

    pub fn get(&self, order_ref: u64) -> Option<&Order> {
        self.orders.get(&order_ref)
    }

    pub fn contains(&self, order_ref: u64) -> bool {
        self.orders.contains_key(&order_ref)
    }

    /// Get number of known orders, exhausted ones included
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get number of orders with size still remaining
    pub fn live_order_count(&self) -> usize {
        self.orders.values().filter(|o| !o.is_exhausted()).count()
    }
}
