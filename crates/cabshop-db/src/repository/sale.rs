//! # Sale Repository
//!
//! Sales, sale items, and the sell-cab transaction.
//!
//! ## Sell-Cab Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sell_cab(order)                                                        │
//! │                                                                         │
//! │  order.validate()  ── Err ──► DbError::Validation  (no I/O at all)     │
//! │       │                                                                 │
//! │  BEGIN ────────────────────────────────────────────────────────────┐   │
//! │  │ 1. SELECT cab price          ── missing ──► NotFound, ROLLBACK  │   │
//! │  │ 2. SELECT each accessory     ── missing ──► warn!, skip line    │   │
//! │  │ 3. total = Σ line subtotals  ── overflow ──► Validation         │   │
//! │  │ 4. INSERT sales                                                 │   │
//! │  │ 5. INSERT sale_items (cab line, then accessory lines)           │   │
//! │  │ 6. UPDATE quantity = quantity - n, status = CASE ...            │   │
//! │  └─ any error in 1, 3, 4, 5, 6 ──► ROLLBACK, nothing visible ──────┘   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is not bound-checked: selling more than is on hand drives the
//! quantity negative and the status to "Out of Stock".

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cabshop_core::filter::SALE_FILTERS;
use cabshop_core::{
    Accessory, Cab, CabSaleOrder, FilterQuery, Money, Page, PricedLine, Sale, SaleChanges,
    SaleComposition, SaleItem, SaleItemType,
};

use crate::error::{DbError, DbResult};
use crate::repository::stock::{decrement, fetch_price};

const SALE_COLUMNS: &str =
    "id, customer_id, sold_by, sale_date, total_price_cents, created_at, updated_at";

const SALE_ITEM_COLUMNS: &str = "id, sale_id, item_type, multi_cab_id, accessory_id, quantity, \
     unit_price_cents, subtotal_cents, created_at, updated_at";

/// Everything a caller needs to render a receipt for a completed sale.
#[derive(Debug, Clone, Serialize)]
pub struct CabSaleReceipt {
    pub sale: Sale,
    /// Cab item first, then accessory items in request order.
    pub items: Vec<SaleItem>,
    pub cab: PricedLine,
    pub accessories: Vec<PricedLine>,
    /// Requested accessory ids that could not be resolved.
    pub skipped_accessories: Vec<i64>,
}

impl CabSaleReceipt {
    pub fn total(&self) -> Money {
        self.sale.total_price()
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Sells a cab plus optional accessories in one transaction.
    ///
    /// ## Errors
    /// - `Validation` - blank customer id or a quantity outside
    ///   `1..=MAX_ITEM_QUANTITY`; nothing is read or written. Also raised,
    ///   with a rollback, when a subtotal or the total overflows `i64`
    /// - `NotFound` - the cab does not exist
    /// - anything else - a statement failed; the transaction was rolled back
    pub async fn sell_cab(&self, order: &CabSaleOrder) -> DbResult<CabSaleReceipt> {
        order.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match write_cab_sale(&mut tx, order).await {
            Ok(receipt) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                info!(
                    sale_id = %receipt.sale.id,
                    cab_id = order.cab_id,
                    quantity = order.quantity,
                    accessories = receipt.accessories.len(),
                    total = %receipt.total(),
                    "Cab sold"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback of failed sale did not complete");
                }
                Err(err)
            }
        }
    }

    pub async fn list(&self, query: &FilterQuery, page: Page) -> DbResult<Vec<Sale>> {
        let clause = SALE_FILTERS.build(query);
        let sql = format!(
            "SELECT {} FROM sales{} ORDER BY sale_date DESC, created_at DESC LIMIT ? OFFSET ?",
            SALE_COLUMNS,
            clause.to_sql()
        );
        debug!(filters = clause.args.len(), "Listing sales");

        let mut q = sqlx::query_as::<_, Sale>(&sql);
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

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?", SALE_COLUMNS);
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, cab line first.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {} FROM sale_items WHERE sale_id = ? \
             ORDER BY CASE item_type WHEN 'cab' THEN 0 ELSE 1 END, created_at, rowid",
            SALE_ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Changes customer, seller or date. Totals and items are never touched.
    pub async fn update(&self, id: &str, changes: &SaleChanges) -> DbResult<Sale> {
        changes.validate()?;

        let sql = format!(
            "UPDATE sales SET \
                customer_id = COALESCE(?1, customer_id), \
                sold_by = COALESCE(?2, sold_by), \
                sale_date = COALESCE(?3, sale_date), \
                updated_at = ?4 \
             WHERE id = ?5 RETURNING {}",
            SALE_COLUMNS
        );
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(changes.customer_id.as_deref().map(str::trim))
            .bind(changes.sold_by.as_deref().map(str::trim))
            .bind(changes.sale_date.as_deref().map(str::trim))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        info!(id, "Sale updated");
        Ok(sale)
    }

    /// Deletes a sale; its items go with it. Stock is not restored.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(id, "Sale deleted");
        Ok(())
    }
}

// =============================================================================
// Transaction body
// =============================================================================

async fn write_cab_sale(
    conn: &mut SqliteConnection,
    order: &CabSaleOrder,
) -> DbResult<CabSaleReceipt> {
    let cab = fetch_price::<Cab>(conn, order.cab_id)
        .await?
        .ok_or_else(|| DbError::not_found("Cab", order.cab_id.to_string()))?;

    let mut composition = SaleComposition::new(PricedLine::cab(
        cab.id,
        cab.name,
        cab.price_cents,
        order.quantity,
    )?);

    for requested in &order.accessories {
        match fetch_price::<Accessory>(conn, requested.id).await {
            Ok(Some(accessory)) => composition.push_accessory(PricedLine::accessory(
                accessory.id,
                accessory.name,
                accessory.price_cents,
                requested.quantity,
            )?),
            Ok(None) => {
                warn!(accessory_id = requested.id, "Accessory not found, skipping sale line");
                composition.skip_accessory(requested.id);
            }
            Err(err) => {
                warn!(accessory_id = requested.id, error = %err, "Accessory lookup failed, skipping sale line");
                composition.skip_accessory(requested.id);
            }
        }
    }

    let total = composition.total()?;

    let now = Utc::now();
    let sale = Sale {
        id: Uuid::new_v4().to_string(),
        customer_id: order.customer_id.trim().to_string(),
        sold_by: order.sold_by.clone(),
        sale_date: now.date_naive().format("%Y-%m-%d").to_string(),
        total_price_cents: total.cents(),
        created_at: now,
        updated_at: now,
    };
    insert_sale(conn, &sale).await?;

    let mut items = Vec::with_capacity(composition.accessories().len() + 1);
    for line in composition.lines() {
        items.push(insert_item(conn, &sale.id, line, now).await?);
    }

    decrement::<Cab>(conn, order.cab_id, order.quantity).await?;
    for line in composition.accessories() {
        decrement::<Accessory>(conn, line.item_id, line.quantity).await?;
    }

    Ok(CabSaleReceipt {
        sale,
        items,
        cab: composition.cab().clone(),
        accessories: composition.accessories().to_vec(),
        skipped_accessories: composition.skipped().to_vec(),
    })
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, total = sale.total_price_cents, "Inserting sale");

    sqlx::query(
        "INSERT INTO sales (id, customer_id, sold_by, sale_date, total_price_cents, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(&sale.sold_by)
    .bind(&sale.sale_date)
    .bind(sale.total_price_cents)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Writes one line with its unit price snapshot.
async fn insert_item(
    conn: &mut SqliteConnection,
    sale_id: &str,
    line: &PricedLine,
    now: DateTime<Utc>,
) -> DbResult<SaleItem> {
    let (multi_cab_id, accessory_id) = match line.item_type {
        SaleItemType::Cab => (Some(line.item_id), None),
        SaleItemType::Accessory => (None, Some(line.item_id)),
    };
    let item = SaleItem {
        id: Uuid::new_v4().to_string(),
        sale_id: sale_id.to_string(),
        item_type: line.item_type,
        multi_cab_id,
        accessory_id,
        quantity: line.quantity,
        unit_price_cents: line.unit_price.cents(),
        subtotal_cents: line.subtotal().cents(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO sale_items (id, sale_id, item_type, multi_cab_id, accessory_id, quantity, \
         unit_price_cents, subtotal_cents, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(item.item_type)
    .bind(item.multi_cab_id)
    .bind(item.accessory_id)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.subtotal_cents)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use cabshop_core::{
        AccessoryOrder, NewStockItem, StockItemChanges, StockStatus, ValidationError,
        MAX_ITEM_QUANTITY,
    };

    fn stock(name: &str, price_cents: i64, quantity: i64) -> NewStockItem {
        NewStockItem {
            name: name.to_string(),
            make: "Suzuki".to_string(),
            unit_color: "white".to_string(),
            price_cents,
            quantity,
            image: None,
        }
    }

    fn order(cab_id: i64, quantity: i64, accessories: Vec<AccessoryOrder>) -> CabSaleOrder {
        CabSaleOrder {
            cab_id,
            customer_id: "cust-1".to_string(),
            quantity,
            sold_by: "user-1".to_string(),
            accessories,
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    async fn setup() -> (Database, Cab, Accessory, Accessory) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cab = db.cabs().create(&stock("Scrum", 20_000_000, 10)).await.unwrap();
        let rack = db.accessories().create(&stock("Roof rack", 450_000, 8)).await.unwrap();
        let cover = db.accessories().create(&stock("Seat cover", 1_250, 4)).await.unwrap();
        (db, cab, rack, cover)
    }

    #[tokio::test]
    async fn test_sale_total_and_items() {
        let (db, cab, rack, cover) = setup().await;

        let receipt = db
            .sales()
            .sell_cab(&order(
                cab.id,
                2,
                vec![
                    AccessoryOrder { id: rack.id, quantity: 1 },
                    AccessoryOrder { id: cover.id, quantity: 3 },
                ],
            ))
            .await
            .unwrap();

        let expected = 20_000_000 * 2 + 450_000 + 1_250 * 3;
        assert_eq!(receipt.sale.total_price_cents, expected);
        assert_eq!(receipt.items.len(), 3);
        assert_eq!(receipt.items[0].item_type, SaleItemType::Cab);
        assert_eq!(receipt.items[0].multi_cab_id, Some(cab.id));
        assert_eq!(receipt.items[0].subtotal_cents, 40_000_000);

        let stored = db.sales().get_by_id(&receipt.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total_price_cents, expected);

        let items = db.sales().get_items(&receipt.sale.id).await.unwrap();
        let sum: i64 = items.iter().map(|i| i.subtotal_cents).sum();
        assert_eq!(sum, stored.total_price_cents);
    }

    #[tokio::test]
    async fn test_sale_decrements_inventory() {
        let (db, cab, rack, _) = setup().await;

        db.sales()
            .sell_cab(&order(cab.id, 3, vec![AccessoryOrder { id: rack.id, quantity: 5 }]))
            .await
            .unwrap();

        let cab_after = db.cabs().get_by_id(cab.id).await.unwrap().unwrap();
        assert_eq!(cab_after.quantity, 7);
        assert_eq!(cab_after.status, StockStatus::Available);

        let rack_after = db.accessories().get_by_id(rack.id).await.unwrap().unwrap();
        assert_eq!(rack_after.quantity, 3);
        assert_eq!(rack_after.status, StockStatus::InStock);
    }

    #[tokio::test]
    async fn test_missing_accessory_is_skipped() {
        let (db, cab, rack, _) = setup().await;

        let receipt = db
            .sales()
            .sell_cab(&order(
                cab.id,
                1,
                vec![
                    AccessoryOrder { id: rack.id, quantity: 1 },
                    AccessoryOrder { id: 9_999, quantity: 1 },
                ],
            ))
            .await
            .unwrap();

        assert_eq!(receipt.accessories.len(), 1);
        assert_eq!(receipt.accessories[0].item_id, rack.id);
        assert_eq!(receipt.skipped_accessories, vec![9_999]);
        assert_eq!(receipt.sale.total_price_cents, 20_000_000 + 450_000);

        let accessory_items = db
            .sales()
            .get_items(&receipt.sale.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|i| i.item_type == SaleItemType::Accessory)
            .count();
        assert_eq!(accessory_items, 1);
    }

    #[tokio::test]
    async fn test_missing_cab_is_not_found_and_writes_nothing() {
        let (db, _, rack, _) = setup().await;

        let err = db
            .sales()
            .sell_cab(&order(404, 1, vec![AccessoryOrder { id: rack.id, quantity: 1 }]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(count(&db, "sales").await, 0);
        let rack_after = db.accessories().get_by_id(rack.id).await.unwrap().unwrap();
        assert_eq!(rack_after.quantity, 8);
    }

    #[tokio::test]
    async fn test_invalid_order_rejected_before_io() {
        let (db, cab, _, _) = setup().await;

        let err = db.sales().sell_cab(&order(cab.id, 0, vec![])).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let mut blank_customer = order(cab.id, 1, vec![]);
        blank_customer.customer_id = "   ".to_string();
        let err = db.sales().sell_cab(&blank_customer).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        assert_eq!(count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_quantity_ceiling() {
        let (db, cab, rack, _) = setup().await;

        let err = db
            .sales()
            .sell_cab(&order(cab.id, MAX_ITEM_QUANTITY + 1, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        let err = db
            .sales()
            .sell_cab(&order(
                cab.id,
                1,
                vec![AccessoryOrder {
                    id: rack.id,
                    quantity: MAX_ITEM_QUANTITY + 1,
                }],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        let cab_after = db.cabs().get_by_id(cab.id).await.unwrap().unwrap();
        assert_eq!(cab_after.quantity, 10);

        let receipt = db
            .sales()
            .sell_cab(&order(cab.id, MAX_ITEM_QUANTITY, vec![]))
            .await
            .unwrap();
        assert_eq!(receipt.sale.total_price_cents, 20_000_000 * MAX_ITEM_QUANTITY);

        let cab_after = db.cabs().get_by_id(cab.id).await.unwrap().unwrap();
        assert_eq!(cab_after.quantity, 10 - MAX_ITEM_QUANTITY);
        assert_eq!(cab_after.status, StockStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_price_overflow_rolls_back() {
        let (db, cab, rack, _) = setup().await;
        sqlx::query("UPDATE multicabs SET price_cents = ? WHERE id = ?")
            .bind(i64::MAX)
            .bind(cab.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.sales().sell_cab(&order(cab.id, 2, vec![])).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        let err = db
            .sales()
            .sell_cab(&order(cab.id, 1, vec![AccessoryOrder { id: rack.id, quantity: 1 }]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        let cab_after = db.cabs().get_by_id(cab.id).await.unwrap().unwrap();
        assert_eq!(cab_after.quantity, 10);
        let rack_after = db.accessories().get_by_id(rack.id).await.unwrap().unwrap();
        assert_eq!(rack_after.quantity, 8);
    }

    #[tokio::test]
    async fn test_failure_while_writing_items_rolls_back() {
        let (db, cab, rack, _) = setup().await;
        sqlx::query(
            "CREATE TRIGGER fail_items BEFORE INSERT ON sale_items \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = db
            .sales()
            .sell_cab(&order(cab.id, 2, vec![AccessoryOrder { id: rack.id, quantity: 1 }]))
            .await;

        assert!(result.is_err());
        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);
        assert_eq!(db.cabs().get_by_id(cab.id).await.unwrap().unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_failure_on_last_decrement_rolls_back_everything() {
        let (db, cab, rack, _) = setup().await;
        sqlx::query(
            "CREATE TRIGGER fail_accessory_decrement BEFORE UPDATE OF quantity ON accessories \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = db
            .sales()
            .sell_cab(&order(cab.id, 2, vec![AccessoryOrder { id: rack.id, quantity: 1 }]))
            .await;

        assert!(result.is_err());
        assert_eq!(count(&db, "sales").await, 0);
        assert_eq!(count(&db, "sale_items").await, 0);

        let cab_after = db.cabs().get_by_id(cab.id).await.unwrap().unwrap();
        assert_eq!(cab_after.quantity, 10);
        assert_eq!(cab_after.status, StockStatus::Available);
        let rack_after = db.accessories().get_by_id(rack.id).await.unwrap().unwrap();
        assert_eq!(rack_after.quantity, 8);
    }

    #[tokio::test]
    async fn test_unit_price_is_a_snapshot() {
        let (db, cab, _, _) = setup().await;
        let receipt = db.sales().sell_cab(&order(cab.id, 1, vec![])).await.unwrap();

        db.cabs()
            .update(
                cab.id,
                &StockItemChanges {
                    price_cents: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let items = db.sales().get_items(&receipt.sale.id).await.unwrap();
        assert_eq!(items[0].unit_price_cents, 20_000_000);
    }

    #[tokio::test]
    async fn test_update_and_cascade_delete() {
        let (db, cab, rack, _) = setup().await;
        let receipt = db
            .sales()
            .sell_cab(&order(cab.id, 1, vec![AccessoryOrder { id: rack.id, quantity: 1 }]))
            .await
            .unwrap();

        let updated = db
            .sales()
            .update(
                &receipt.sale.id,
                &SaleChanges {
                    sale_date: Some("2026-01-15".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.sale_date, "2026-01-15");
        assert_eq!(updated.total_price_cents, receipt.sale.total_price_cents);

        let by_date = db
            .sales()
            .list(&FilterQuery::new().with("sale_date", "2026-01-15"), Page::default())
            .await
            .unwrap();
        assert_eq!(by_date.len(), 1);

        db.sales().delete(&receipt.sale.id).await.unwrap();
        assert_eq!(count(&db, "sale_items").await, 0);
    }
}
