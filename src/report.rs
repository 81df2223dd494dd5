//! # Report Aggregator
//!
//! Admin summaries over all orders: a digest across every day, and a
//! per-day breakdown by user with cross-user dish totals.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CartError, StoreError};
use crate::menu::Menu;
use crate::store::{Order, Store};

/// Maximum characters per outgoing report message
pub const MESSAGE_CHUNK_LIMIT: usize = 3500;

/// Summed dish quantities for one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: String,
    pub dishes: Vec<(String, i64)>,
}

/// One user's items on a given day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOrders {
    pub user_id: i64,
    pub username: Option<String>,
    pub items: Vec<(String, i64)>,
}

/// Breakdown of a single day's orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub day: String,
    /// Ordered by username, users without one last
    pub users: Vec<UserOrders>,
    /// Ordered by descending total, then dish name
    pub totals: Vec<(String, i64)>,
}

impl DayReport {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Accumulates values per key, keeping first-seen key order
struct OrderedSums<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, i64)>,
}

impl<K: std::hash::Hash + Eq + Clone> OrderedSums<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: &K, amount: i64) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key.clone(), amount));
            }
        }
    }

    fn into_entries(self) -> Vec<(K, i64)> {
        self.entries
    }
}

/// Group every order by day, then by dish.
///
/// Days follow the menu order; days no longer on the menu come after, in
/// the order they first appear. Dishes keep first-seen order within a day.
pub fn summarize_all(menu: &Menu, orders: &[Order]) -> Vec<DaySummary> {
    let mut day_order: Vec<&str> = Vec::new();
    let mut per_day: HashMap<&str, OrderedSums<String>> = HashMap::new();

    for order in orders {
        let sums = per_day.entry(order.day.as_str()).or_insert_with(|| {
            day_order.push(order.day.as_str());
            OrderedSums::new()
        });
        sums.add(&order.dish, i64::from(order.quantity));
    }

    day_order.sort_by_key(|day| menu.day_index(day).unwrap_or(usize::MAX));

    day_order
        .into_iter()
        .filter_map(|day| {
            per_day.remove(day).map(|sums| DaySummary {
                day: day.to_string(),
                dishes: sums.into_entries(),
            })
        })
        .collect()
}

/// Break one day's orders down by user and total them per dish
pub fn summarize_day(day: &str, orders: &[Order]) -> DayReport {
    let mut per_user: OrderedSums<(i64, Option<String>)> = OrderedSums::new();
    let mut items: HashMap<(i64, Option<String>), OrderedSums<String>> = HashMap::new();
    let mut totals: OrderedSums<String> = OrderedSums::new();

    for order in orders.iter().filter(|o| o.day == day) {
        let who = (order.user_id, order.username.clone());
        let quantity = i64::from(order.quantity);
        per_user.add(&who, quantity);
        items
            .entry(who)
            .or_insert_with(OrderedSums::new)
            .add(&order.dish, quantity);
        totals.add(&order.dish, quantity);
    }

    let mut users: Vec<UserOrders> = per_user
        .into_entries()
        .into_iter()
        .map(|(who, _)| {
            let dishes = items
                .remove(&who)
                .map(OrderedSums::into_entries)
                .unwrap_or_default();
            UserOrders {
                user_id: who.0,
                username: who.1,
                items: dishes,
            }
        })
        .collect();
    users.sort_by(|a, b| match (&a.username, &b.username) {
        (Some(x), Some(y)) => x.cmp(y).then(a.user_id.cmp(&b.user_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.user_id.cmp(&b.user_id),
    });

    let mut totals = totals.into_entries();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    DayReport {
        day: day.to_string(),
        users,
        totals,
    }
}

/// Split rendered blocks into messages of at most `limit` characters.
///
/// Blocks are never split; a block that alone exceeds the limit travels in
/// its own message.
pub fn paginate<I, T>(blocks: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for block in blocks {
        let block = block.as_ref();
        let block_len = block.chars().count();
        if current_len > 0 && current_len + block_len > limit {
            pages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(block);
        current_len += block_len;
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

/// Report queries against a [`Store`]
pub struct ReportAggregator<S> {
    store: Arc<S>,
}

impl<S> Clone for ReportAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> ReportAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn full_report(&self) -> Result<Vec<DaySummary>, StoreError> {
        let menu = self.store.load_menu().await?;
        let orders = self.store.all_orders().await?;
        Ok(summarize_all(&menu, &orders))
    }

    pub async fn day_report(&self, day: &str) -> Result<DayReport, StoreError> {
        let orders = self.store.day_orders(day).await?;
        Ok(summarize_day(day, &orders))
    }

    /// Day report addressed by a 1-based day index from a button
    pub async fn day_report_at(&self, day_index: i64) -> Result<DayReport, CartError> {
        let menu = self.store.load_menu().await?;
        let day = menu.resolve_day(day_index)?.name.clone();
        Ok(self.day_report(&day).await?)
    }
}
