//! # Stock Repository
//!
//! Cabs (`multicabs`) and accessories (`accessories`) share one table shape
//! and one set of rules, so both are served by [`StockRepository<T>`].
//!
//! ## Status Maintenance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(quantity = 4)        → status = StockStatus::from_quantity(4)  │
//! │                                       = "In Stock"                      │
//! │  update(quantity = Some(1))  → status = "Low Stock"                    │
//! │  update(price = Some(..))    → status untouched                         │
//! │  decrement(2)  (sale)        → status = CASE on (quantity - 2) in SQL  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::marker::PhantomData;

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use cabshop_core::filter::{ACCESSORY_FILTERS, CAB_FILTERS};
use cabshop_core::{
    Accessory, Cab, FilterQuery, FilterSpec, NewStockItem, Page, StockItemChanges, StockStatus,
};

use crate::error::{DbError, DbResult};

const STOCK_COLUMNS: &str =
    "id, name, make, unit_color, price_cents, quantity, status, image, created_at, updated_at";

/// Minimal row used while pricing a sale line.
#[derive(Debug, Clone, FromRow)]
pub struct PriceRow {
    pub id: i64,
    pub name: String,
    pub price_cents: i64,
}

/// A table holding sellable stock.
pub trait StockTable: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;
    const FILTERS: FilterSpec;

    fn id(&self) -> i64;
}

impl StockTable for Cab {
    const TABLE: &'static str = "multicabs";
    const ENTITY: &'static str = "Cab";
    const FILTERS: FilterSpec = CAB_FILTERS;

    fn id(&self) -> i64 {
        self.id
    }
}

impl StockTable for Accessory {
    const TABLE: &'static str = "accessories";
    const ENTITY: &'static str = "Accessory";
    const FILTERS: FilterSpec = ACCESSORY_FILTERS;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Repository for one stock table.
#[derive(Debug)]
pub struct StockRepository<T> {
    pool: SqlitePool,
    _table: PhantomData<fn() -> T>,
}

impl<T> Clone for StockRepository<T> {
    fn clone(&self) -> Self {
        StockRepository {
            pool: self.pool.clone(),
            _table: PhantomData,
        }
    }
}

pub type CabRepository = StockRepository<Cab>;
pub type AccessoryRepository = StockRepository<Accessory>;

impl<T: StockTable> StockRepository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository {
            pool,
            _table: PhantomData,
        }
    }

    /// Lists rows matching `query`, ordered by id.
    pub async fn list(&self, query: &FilterQuery, page: Page) -> DbResult<Vec<T>> {
        let clause = T::FILTERS.build(query);
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY id LIMIT ? OFFSET ?",
            STOCK_COLUMNS,
            T::TABLE,
            clause.to_sql()
        );
        debug!(table = T::TABLE, filters = clause.args.len(), "Listing stock");

        let mut q = sqlx::query_as::<_, T>(&sql);
        for arg in &clause.args {
            q = q.bind(arg);
        }
        let rows = q
            .bind(i64::from(page.limit))
            .bind(i64::from(page.offset))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<T>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", STOCK_COLUMNS, T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Inserts a row; status is derived from the quantity.
    pub async fn create(&self, item: &NewStockItem) -> DbResult<T> {
        item.validate()?;
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO {} (name, make, unit_color, price_cents, quantity, status, image, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            T::TABLE,
            STOCK_COLUMNS
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(item.name.trim())
            .bind(&item.make)
            .bind(&item.unit_color)
            .bind(item.price_cents)
            .bind(item.quantity)
            .bind(item.status())
            .bind(&item.image)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        info!(table = T::TABLE, name = %item.name, quantity = item.quantity, "Stock item created");
        Ok(row)
    }

    /// Applies the given changes; status is recomputed only when quantity
    /// is part of them.
    pub async fn update(&self, id: i64, changes: &StockItemChanges) -> DbResult<T> {
        changes.validate()?;

        let sql = format!(
            "UPDATE {} SET \
                name = COALESCE(?1, name), \
                make = COALESCE(?2, make), \
                unit_color = COALESCE(?3, unit_color), \
                price_cents = COALESCE(?4, price_cents), \
                quantity = COALESCE(?5, quantity), \
                status = COALESCE(?6, status), \
                image = COALESCE(?7, image), \
                updated_at = ?8 \
             WHERE id = ?9 RETURNING {}",
            T::TABLE,
            STOCK_COLUMNS
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(&changes.make)
            .bind(&changes.unit_color)
            .bind(changes.price_cents)
            .bind(changes.quantity)
            .bind(changes.status())
            .bind(&changes.image)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(T::ENTITY, id.to_string()))?;

        info!(table = T::TABLE, id, "Stock item updated");
        Ok(row)
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(T::ENTITY, id.to_string()));
        }

        info!(table = T::TABLE, id, "Stock item deleted");
        Ok(())
    }
}

// =============================================================================
// Transaction-scoped helpers (used by the sale workflow)
// =============================================================================

/// Reads the id, name and current price of a row on `conn`.
pub(crate) async fn fetch_price<T: StockTable>(
    conn: &mut SqliteConnection,
    id: i64,
) -> DbResult<Option<PriceRow>> {
    let sql = format!("SELECT id, name, price_cents FROM {} WHERE id = ?", T::TABLE);
    let row = sqlx::query_as::<_, PriceRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row)
}

/// Subtracts `amount` from a row's quantity and recomputes its status in
/// the same statement. No lower bound is enforced.
pub(crate) async fn decrement<T: StockTable>(
    conn: &mut SqliteConnection,
    id: i64,
    amount: i64,
) -> DbResult<()> {
    let sql = format!(
        "UPDATE {} SET quantity = quantity - ?1, status = {}, updated_at = ?2 WHERE id = ?3",
        T::TABLE,
        StockStatus::sql_case("quantity - ?1")
    );
    let result = sqlx::query(&sql)
        .bind(amount)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(T::ENTITY, id.to_string()));
    }

    debug!(table = T::TABLE, id, amount, "Stock decremented");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
