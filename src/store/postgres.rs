//! PostgreSQL-backed [`Store`].

use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::{debug, info};

use super::{Order, OrderKey, Store};
use crate::error::StoreError;
use crate::menu::Menu;

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<(), StoreError> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orders (
            user_id BIGINT NOT NULL,
            username TEXT,
            day TEXT NOT NULL,
            dish TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            UNIQUE(user_id, day, dish)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS menu (
            day TEXT PRIMARY KEY,
            dishes TEXT NOT NULL,
            updated_at TIMESTAMPTZ DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    // Tables created before day ordering was tracked lack this column
    sqlx::query("ALTER TABLE menu ADD COLUMN IF NOT EXISTS position INTEGER NOT NULL DEFAULT 0")
        .execute(pool)
        .await?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    async fn load_menu(&self) -> Result<Menu, StoreError> {
        let rows = sqlx::query("SELECT day, dishes FROM menu ORDER BY position, day")
            .fetch_all(&self.pool)
            .await?;

        let mut days = Vec::with_capacity(rows.len());
        for row in rows {
            let day: String = row.try_get("day")?;
            let raw: String = row.try_get("dishes")?;
            let dishes: Vec<String> = serde_json::from_str(&raw)
                .map_err(|source| StoreError::CorruptDishes { day: day.clone(), source })?;
            days.push((day, dishes));
        }

        debug!(days = days.len(), "Loaded menu");
        Ok(days.into_iter().collect())
    }

    async fn replace_menu(&self, menu: &Menu) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM menu").execute(&mut *tx).await?;

        for (position, day) in menu.days().iter().enumerate() {
            let dishes = serde_json::to_string(&day.dishes).map_err(|source| {
                StoreError::CorruptDishes {
                    day: day.name.clone(),
                    source,
                }
            })?;
            sqlx::query("INSERT INTO menu (day, dishes, position) VALUES ($1, $2, $3)")
                .bind(&day.name)
                .bind(dishes)
                .bind(position as i32)
                .execute(&mut *tx)
                .await?;
        }

        let cleared = sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;

        tx.commit().await?;

        info!(
            days = menu.day_count(),
            orders_cleared = cleared.rows_affected(),
            "Menu replaced"
        );
        Ok(())
    }

    async fn order_quantity(&self, key: &OrderKey) -> Result<Option<i32>, StoreError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM orders WHERE user_id = $1 AND day = $2 AND dish = $3",
        )
        .bind(key.user_id)
        .bind(&key.day)
        .bind(&key.dish)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quantity)
    }

    async fn add_portion(&self, key: &OrderKey, username: Option<&str>) -> Result<i32, StoreError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            "INSERT INTO orders (user_id, username, day, dish, quantity) VALUES ($1, $2, $3, $4, 1)
             ON CONFLICT (user_id, day, dish) DO UPDATE SET quantity = orders.quantity + 1
             RETURNING quantity",
        )
        .bind(key.user_id)
        .bind(username)
        .bind(&key.day)
        .bind(&key.dish)
        .fetch_one(&self.pool)
        .await?;
        Ok(quantity)
    }

    async fn set_order_quantity(&self, key: &OrderKey, quantity: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET quantity = $1 WHERE user_id = $2 AND day = $3 AND dish = $4",
        )
        .bind(quantity)
        .bind(key.user_id)
        .bind(&key.day)
        .bind(&key.dish)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_order(&self, key: &OrderKey) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND day = $2 AND dish = $3")
            .bind(key.user_id)
            .bind(&key.day)
            .bind(&key.dish)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&self, user_id: i64, day: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND day = $2")
            .bind(user_id)
            .bind(day)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn user_orders(&self, user_id: i64, day: &str) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT user_id, username, day, dish, quantity FROM orders
             WHERE user_id = $1 AND day = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT user_id, username, day, dish, quantity FROM orders",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn day_orders(&self, day: &str) -> Result<Vec<Order>, StoreError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT user_id, username, day, dish, quantity FROM orders WHERE day = $1",
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
