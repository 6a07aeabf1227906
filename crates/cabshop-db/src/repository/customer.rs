//! # Customer Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use cabshop_core::filter::CUSTOMER_FILTERS;
use cabshop_core::{Customer, CustomerChanges, FilterQuery, NewCustomer, Page};

use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn list(&self, query: &FilterQuery, page: Page) -> DbResult<Vec<Customer>> {
        let clause = CUSTOMER_FILTERS.build(query);
        let sql = format!(
            "SELECT {} FROM customers{} ORDER BY name, id LIMIT ? OFFSET ?",
            CUSTOMER_COLUMNS,
            clause.to_sql()
        );
        debug!(filters = clause.args.len(), "Listing customers");

        let mut q = sqlx::query_as::<_, Customer>(&sql);
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

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS);
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Inserts a customer. A duplicate email yields `UniqueViolation`.
    pub async fn create(&self, customer: &NewCustomer) -> DbResult<Customer> {
        customer.validate()?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let email = customer.email.as_deref().map(str::trim);

        let sql = format!(
            "INSERT INTO customers (id, name, email, phone, address, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(&id)
            .bind(customer.name.trim())
            .bind(email)
            .bind(&customer.phone)
            .bind(&customer.address)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(email.unwrap_or_default()))?;

        info!(id = %row.id, "Customer created");
        Ok(row)
    }

    pub async fn update(&self, id: &str, changes: &CustomerChanges) -> DbResult<Customer> {
        changes.validate()?;
        let email = changes.email.as_deref().map(str::trim);

        let sql = format!(
            "UPDATE customers SET \
                name = COALESCE(?1, name), \
                email = COALESCE(?2, email), \
                phone = COALESCE(?3, phone), \
                address = COALESCE(?4, address), \
                updated_at = ?5 \
             WHERE id = ?6 RETURNING {}",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(email)
            .bind(&changes.phone)
            .bind(&changes.address)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(email.unwrap_or_default()))?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        info!(id, "Customer updated");
        Ok(row)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(id, "Customer deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn customer(name: &str, email: Option<&str>) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: Some("0917 000 0000".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_customer_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo
            .create(&customer("Juan Dela Cruz", Some("juan@example.com")))
            .await
            .unwrap();
        assert_eq!(created.id.len(), 36);

        let updated = repo
            .update(
                &created.id,
                &CustomerChanges {
                    address: Some("Cebu City".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("Cebu City"));
        assert_eq!(updated.email.as_deref(), Some("juan@example.com"));

        repo.delete(&created.id).await.unwrap();
        assert!(matches!(
            repo.delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        repo.create(&customer("Ana", Some("ana@example.com"))).await.unwrap();

        let err = repo
            .create(&customer("Ana Two", Some("ana@example.com")))
            .await
            .unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, "ana@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_customers_without_email_do_not_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        repo.create(&customer("Walk-in A", None)).await.unwrap();
        repo.create(&customer("Walk-in B", None)).await.unwrap();

        let found = repo
            .list(&FilterQuery::new().with("search", "walk-in"), Page::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }
}
