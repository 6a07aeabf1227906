//! # Material Repository
//!
//! Workshop materials. Same list/CRUD shape as stock, without status and
//! never touched by sales.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use cabshop_core::filter::MATERIAL_FILTERS;
use cabshop_core::{FilterQuery, Material, MaterialChanges, NewMaterial, Page};

use crate::error::{DbError, DbResult};

const MATERIAL_COLUMNS: &str =
    "id, name, category, supplier, unit, quantity, cost_cents, created_at, updated_at";

/// Repository for material database operations.
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    pool: SqlitePool,
}

impl MaterialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MaterialRepository { pool }
    }

    pub async fn list(&self, query: &FilterQuery, page: Page) -> DbResult<Vec<Material>> {
        let clause = MATERIAL_FILTERS.build(query);
        let sql = format!(
            "SELECT {} FROM materials{} ORDER BY name, id LIMIT ? OFFSET ?",
            MATERIAL_COLUMNS,
            clause.to_sql()
        );
        debug!(filters = clause.args.len(), "Listing materials");

        let mut q = sqlx::query_as::<_, Material>(&sql);
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

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Material>> {
        let sql = format!("SELECT {} FROM materials WHERE id = ?", MATERIAL_COLUMNS);
        let row = sqlx::query_as::<_, Material>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn create(&self, material: &NewMaterial) -> DbResult<Material> {
        material.validate()?;
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO materials (name, category, supplier, unit, quantity, cost_cents, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            MATERIAL_COLUMNS
        );
        let row = sqlx::query_as::<_, Material>(&sql)
            .bind(material.name.trim())
            .bind(&material.category)
            .bind(&material.supplier)
            .bind(&material.unit)
            .bind(material.quantity)
            .bind(material.cost_cents)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        info!(id = row.id, name = %row.name, "Material created");
        Ok(row)
    }

    pub async fn update(&self, id: i64, changes: &MaterialChanges) -> DbResult<Material> {
        changes.validate()?;

        let sql = format!(
            "UPDATE materials SET \
                name = COALESCE(?1, name), \
                category = COALESCE(?2, category), \
                supplier = COALESCE(?3, supplier), \
                unit = COALESCE(?4, unit), \
                quantity = COALESCE(?5, quantity), \
                cost_cents = COALESCE(?6, cost_cents), \
                updated_at = ?7 \
             WHERE id = ?8 RETURNING {}",
            MATERIAL_COLUMNS
        );
        let row = sqlx::query_as::<_, Material>(&sql)
            .bind(changes.name.as_deref().map(str::trim))
            .bind(&changes.category)
            .bind(&changes.supplier)
            .bind(&changes.unit)
            .bind(changes.quantity)
            .bind(changes.cost_cents)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Material", id.to_string()))?;

        info!(id, "Material updated");
        Ok(row)
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Material", id.to_string()));
        }

        info!(id, "Material deleted");
        Ok(())
    }
}
