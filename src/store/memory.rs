//! In-process [`Store`] used by tests and local experiments.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{Order, OrderKey, Store};
use crate::error::StoreError;
use crate::menu::Menu;

#[derive(Debug, Default)]
struct Tables {
    menu: Menu,
    orders: Vec<Order>,
}

/// Menu and orders held in memory, rows kept in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a menu without touching orders
    pub fn with_menu(menu: Menu) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.lock() {
            tables.menu = menu;
        }
        store
    }

    /// Make every following call fail until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn matches_key(order: &Order, key: &OrderKey) -> bool {
    order.user_id == key.user_id && order.day == key.day && order.dish == key.dish
}

impl Store for MemoryStore {
    async fn load_menu(&self) -> Result<Menu, StoreError> {
        Ok(self.tables()?.menu.clone())
    }

    async fn replace_menu(&self, menu: &Menu) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        tables.menu = menu.clone();
        tables.orders.clear();
        Ok(())
    }

    async fn order_quantity(&self, key: &OrderKey) -> Result<Option<i32>, StoreError> {
        Ok(self
            .tables()?
            .orders
            .iter()
            .find(|o| matches_key(o, key))
            .map(|o| o.quantity))
    }

    async fn add_portion(&self, key: &OrderKey, username: Option<&str>) -> Result<i32, StoreError> {
        let mut tables = self.tables()?;
        if let Some(order) = tables.orders.iter_mut().find(|o| matches_key(o, key)) {
            order.quantity += 1;
            return Ok(order.quantity);
        }
        tables.orders.push(Order {
            user_id: key.user_id,
            username: username.map(str::to_string),
            day: key.day.clone(),
            dish: key.dish.clone(),
            quantity: 1,
        });
        Ok(1)
    }

    async fn set_order_quantity(&self, key: &OrderKey, quantity: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables.orders.iter_mut().find(|o| matches_key(o, key)) {
            Some(order) => {
                order.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_order(&self, key: &OrderKey) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.orders.len();
        tables.orders.retain(|o| !matches_key(o, key));
        Ok(tables.orders.len() != before)
    }

    async fn clear_cart(&self, user_id: i64, day: &str) -> Result<u64, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.orders.len();
        tables
            .orders
            .retain(|o| !(o.user_id == user_id && o.day == day));
        Ok((before - tables.orders.len()) as u64)
    }

    async fn user_orders(&self, user_id: i64, day: &str) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .tables()?
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && o.day == day)
            .cloned()
            .collect())
    }

    async fn all_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.tables()?.orders.clone())
    }

    async fn day_orders(&self, day: &str) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .tables()?
            .orders
            .iter()
            .filter(|o| o.day == day)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_portion_keeps_one_row_per_key() {
        let store = MemoryStore::new();
        let key = OrderKey::new(1, "Monday", "Soup");
        assert_eq!(store.add_portion(&key, Some("alice")).await.unwrap(), 1);
        assert_eq!(store.add_portion(&key, Some("alice")).await.unwrap(), 2);
        let orders = store.user_orders(1, "Monday").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_unavailable_switch() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.load_menu().await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.load_menu().await.unwrap().is_empty());
    }
}
