//! Persistence seam for the menu and order tables.
//!
//! Handlers receive the store as an explicit value; production wires in
//! [`PgStore`], tests use [`MemoryStore`].

use std::future::Future;

use crate::error::StoreError;
use crate::menu::Menu;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Identity of one order row: at most one exists per key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderKey {
    pub user_id: i64,
    pub day: String,
    pub dish: String,
}

impl OrderKey {
    pub fn new(user_id: i64, day: &str, dish: &str) -> Self {
        Self {
            user_id,
            day: day.to_string(),
            dish: dish.to_string(),
        }
    }
}

/// A persisted order row; `quantity` is always at least 1
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Order {
    pub user_id: i64,
    pub username: Option<String>,
    pub day: String,
    pub dish: String,
    pub quantity: i32,
}

/// Operations the bot performs against persistent state
pub trait Store: Send + Sync {
    /// Current menu snapshot, empty when nothing has been ingested
    fn load_menu(&self) -> impl Future<Output = Result<Menu, StoreError>> + Send;

    /// Replace the menu and drop every order, as one unit
    fn replace_menu(&self, menu: &Menu) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn order_quantity(
        &self,
        key: &OrderKey,
    ) -> impl Future<Output = Result<Option<i32>, StoreError>> + Send;

    /// Add one portion in a single step: insert the row at quantity 1 or
    /// raise the existing row by one. Returns the new quantity.
    fn add_portion(
        &self,
        key: &OrderKey,
        username: Option<&str>,
    ) -> impl Future<Output = Result<i32, StoreError>> + Send;

    /// Returns `false` when no row matched
    fn set_order_quantity(
        &self,
        key: &OrderKey,
        quantity: i32,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Returns `false` when no row matched
    fn delete_order(&self, key: &OrderKey) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete a user's rows for one day, returning how many went
    fn clear_cart(
        &self,
        user_id: i64,
        day: &str,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn user_orders(
        &self,
        user_id: i64,
        day: &str,
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    fn all_orders(&self) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    fn day_orders(&self, day: &str) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;
}
