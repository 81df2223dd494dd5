//! # Cart Controller
//!
//! Per (user, day) order state. A cart is either empty or holds rows with a
//! quantity of at least one; a row that would drop to zero is deleted instead.
//!
//! Every index-based entry point re-reads the menu first, so a button
//! rendered before a menu replacement resolves against the current snapshot
//! or fails without writing anything.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CartError, StoreError};
use crate::menu::Menu;
use crate::store::{OrderKey, Store};

/// Who is acting on a cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub user_id: i64,
    pub username: Option<String>,
}

impl Customer {
    pub fn new(user_id: i64, username: Option<&str>) -> Self {
        Self {
            user_id,
            username: username.map(str::to_string),
        }
    }
}

/// Result of a quantity change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// The row now holds `quantity`
    Quantity { dish: String, quantity: i32 },
    /// The row was deleted
    Removed { dish: String },
    /// No row existed, nothing changed
    Unchanged { dish: String },
}

/// One line of a cart view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub dish: String,
    pub quantity: i32,
    /// Position of the dish in the live menu, `None` once it has left the menu
    pub dish_index: Option<usize>,
}

/// Data needed to render the clear-cart confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearPrompt {
    pub day: String,
    pub day_index: i64,
    pub target_user: i64,
}

/// Cart operations against a [`Store`]
pub struct CartController<S> {
    store: Arc<S>,
}

impl<S> Clone for CartController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> CartController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn menu(&self) -> Result<Menu, StoreError> {
        self.store.load_menu().await
    }

    /// Add one portion, creating the row on first add
    pub async fn add(&self, customer: &Customer, day: &str, dish: &str) -> Result<CartChange, CartError> {
        let key = OrderKey::new(customer.user_id, day, dish);
        let quantity = self
            .store
            .add_portion(&key, customer.username.as_deref())
            .await?;
        info!(user_id = customer.user_id, day, dish, quantity, "Added to cart");
        Ok(CartChange::Quantity {
            dish: dish.to_string(),
            quantity,
        })
    }

    /// Add one portion of the dish at (`day_index`, `dish_index`)
    pub async fn add_at(
        &self,
        customer: &Customer,
        day_index: i64,
        dish_index: i64,
    ) -> Result<CartChange, CartError> {
        let menu = self.menu().await?;
        let (day, dish) = menu.resolve_dish(day_index, dish_index)?;
        self.add(customer, day, dish).await
    }

    /// Raise an existing row by one; absent rows stay absent
    pub async fn increment(&self, user_id: i64, day: &str, dish: &str) -> Result<CartChange, CartError> {
        let key = OrderKey::new(user_id, day, dish);
        let change = match self.store.order_quantity(&key).await? {
            Some(current) => {
                let quantity = current + 1;
                self.store.set_order_quantity(&key, quantity).await?;
                CartChange::Quantity {
                    dish: dish.to_string(),
                    quantity,
                }
            }
            None => CartChange::Unchanged {
                dish: dish.to_string(),
            },
        };
        debug!(user_id, day, dish, change = ?change, "Cart increment");
        Ok(change)
    }

    pub async fn increment_at(
        &self,
        user_id: i64,
        day_index: i64,
        dish_index: i64,
    ) -> Result<CartChange, CartError> {
        let menu = self.menu().await?;
        let (day, dish) = menu.resolve_dish(day_index, dish_index)?;
        self.increment(user_id, day, dish).await
    }

    /// Lower an existing row by one, deleting it instead of storing zero
    pub async fn decrement(&self, user_id: i64, day: &str, dish: &str) -> Result<CartChange, CartError> {
        let key = OrderKey::new(user_id, day, dish);
        let change = match self.store.order_quantity(&key).await? {
            Some(current) if current > 1 => {
                let quantity = current - 1;
                self.store.set_order_quantity(&key, quantity).await?;
                CartChange::Quantity {
                    dish: dish.to_string(),
                    quantity,
                }
            }
            Some(_) => {
                self.store.delete_order(&key).await?;
                CartChange::Removed {
                    dish: dish.to_string(),
                }
            }
            None => CartChange::Unchanged {
                dish: dish.to_string(),
            },
        };
        debug!(user_id, day, dish, change = ?change, "Cart decrement");
        Ok(change)
    }

    pub async fn decrement_at(
        &self,
        user_id: i64,
        day_index: i64,
        dish_index: i64,
    ) -> Result<CartChange, CartError> {
        let menu = self.menu().await?;
        let (day, dish) = menu.resolve_dish(day_index, dish_index)?;
        self.decrement(user_id, day, dish).await
    }

    /// First step of clearing: resolve the day and bind the prompt to `user_id`
    pub async fn request_clear(&self, user_id: i64, day_index: i64) -> Result<ClearPrompt, CartError> {
        let menu = self.menu().await?;
        let day = menu.resolve_day(day_index)?;
        Ok(ClearPrompt {
            day: day.name.clone(),
            day_index,
            target_user: user_id,
        })
    }

    /// Second step of clearing. Only the user the prompt was issued to may
    /// confirm it; anyone else gets [`CartError::Forbidden`] and nothing is
    /// deleted.
    pub async fn confirm_clear(
        &self,
        acting_user: i64,
        day_index: i64,
        target_user: i64,
    ) -> Result<(String, u64), CartError> {
        if acting_user != target_user {
            return Err(CartError::Forbidden {
                acting: acting_user,
                target: target_user,
            });
        }
        let menu = self.menu().await?;
        let day = menu.resolve_day(day_index)?.name.clone();
        let removed = self.store.clear_cart(target_user, &day).await?;
        info!(user_id = target_user, day = %day, removed, "Cart cleared");
        Ok((day, removed))
    }

    /// Read-only projection of a user's cart, in menu order
    pub async fn view(&self, user_id: i64, day: &str) -> Result<Vec<CartLine>, CartError> {
        let menu = self.menu().await?;
        let orders = self.store.user_orders(user_id, day).await?;
        let menu_day = menu.day(day);

        let mut lines: Vec<CartLine> = orders
            .into_iter()
            .map(|order| CartLine {
                dish_index: menu_day.and_then(|d| d.dish_index(&order.dish)),
                dish: order.dish,
                quantity: order.quantity,
            })
            .collect();
        lines.sort_by(|a, b| {
            let rank = |line: &CartLine| line.dish_index.unwrap_or(usize::MAX);
            rank(a).cmp(&rank(b)).then_with(|| a.dish.cmp(&b.dish))
        });
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn controller() -> CartController<MemoryStore> {
        let menu = Menu::from_iter([(
            "Monday".to_string(),
            vec!["Soup".to_string(), "Cutlet".to_string()],
        )]);
        CartController::new(Arc::new(MemoryStore::with_menu(menu)))
    }

    #[tokio::test]
    async fn test_increment_absent_row_is_noop() {
        let cart = controller();
        let change = cart.increment(1, "Monday", "Soup").await.unwrap();
        assert_eq!(
            change,
            CartChange::Unchanged {
                dish: "Soup".to_string()
            }
        );
        assert!(cart.view(1, "Monday").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_view_orders_by_menu_position() {
        let cart = controller();
        let customer = Customer::new(1, Some("alice"));
        cart.add(&customer, "Monday", "Cutlet").await.unwrap();
        cart.add(&customer, "Monday", "Soup").await.unwrap();

        let view = cart.view(1, "Monday").await.unwrap();
        let dishes: Vec<_> = view.iter().map(|l| l.dish.as_str()).collect();
        assert_eq!(dishes, vec!["Soup", "Cutlet"]);
        assert_eq!(view[0].dish_index, Some(0));
    }
}
