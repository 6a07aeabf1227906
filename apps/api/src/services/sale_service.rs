//! Sell-cab service.
//!
//! ```text
//! SellCabRequest ──► CabSaleOrder ──► validate() ── Err ──► 400, store untouched
//!                                         │
//!                                         ▼
//!                                CabSales::sell_cab ──► CabSaleReceipt
//! ```

use std::future::Future;

use tracing::debug;

use cabshop_core::CabSaleOrder;
use cabshop_db::{CabSaleReceipt, DbResult, SaleRepository};

use crate::error::ApiError;

/// Anything that can persist a cab sale atomically.
pub trait CabSales: Send + Sync {
    fn sell_cab(
        &self,
        order: &CabSaleOrder,
    ) -> impl Future<Output = DbResult<CabSaleReceipt>> + Send;
}

impl CabSales for SaleRepository {
    async fn sell_cab(&self, order: &CabSaleOrder) -> DbResult<CabSaleReceipt> {
        SaleRepository::sell_cab(self, order).await
    }
}

/// Validates orders before they reach the store.
pub struct SaleService<S> {
    store: S,
}

impl<S: CabSales> SaleService<S> {
    pub fn new(store: S) -> Self {
        SaleService { store }
    }

    pub async fn sell(&self, order: &CabSaleOrder) -> Result<CabSaleReceipt, ApiError> {
        order.validate()?;

        debug!(
            cab_id = order.cab_id,
            quantity = order.quantity,
            accessories = order.accessories.len(),
            "Order validated"
        );

        Ok(self.store.sell_cab(order).await?)
    }
}
