// ==========================================
// 仓库拣货核心 - 仓库总览 API
// ==========================================
// 职责: 按状态列出订单概要、统计各状态订单数
// 红线: 只读,不修改订单
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::api::error::{ApiError, ApiResult};
use crate::config::PickingConfigReader;
use crate::domain::order::Order;
use crate::domain::types::{DeliveryPriority, OrderStatus};
use crate::engine::progress::order_percent;
use crate::i18n;
use crate::repository::order_repo::OrderStore;

// ==========================================
// 视图对象
// ==========================================

/// 订单概要（列表行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOverview {
    pub order_id: String,
    pub order_number: String,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub route: String,
    pub status: OrderStatus,
    pub status_label: String,
    pub priority: DeliveryPriority,
    pub priority_label: String,
    pub ordered_at: NaiveDateTime,
    pub estimated_delivery: NaiveDate,
    pub total_items: usize,
    pub total_articles: u64,
    pub percent: u8,
}

/// 各状态订单数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_picking: usize,
    pub prepared: usize,
}

// ==========================================
// WarehouseApi - 仓库总览 API
// ==========================================
pub struct WarehouseApi {
    store: Arc<dyn OrderStore>,
    config: Arc<dyn PickingConfigReader>,
}

impl WarehouseApi {
    /// 创建新的WarehouseApi实例
    pub fn new(store: Arc<dyn OrderStore>, config: Arc<dyn PickingConfigReader>) -> Self {
        Self { store, config }
    }

    /// 按状态列出订单概要
    pub async fn list_orders(&self, status: OrderStatus) -> ApiResult<Vec<OrderOverview>> {
        let orders = self.store.query_orders_by_status(status).await.map_err(|e| {
            error!(status = %status, error = %e, "订单列表查询失败");
            ApiError::from(e)
        })?;

        let (urgent_days, routine_days) = self.delivery_offsets().await?;
        debug!(status = %status, count = orders.len(), "订单列表已查询");

        orders
            .iter()
            .map(|o| Self::to_overview(o, urgent_days, routine_days))
            .collect()
    }

    /// 统计 Pending / InPicking / Prepared 订单数
    pub async fn status_counts(&self) -> ApiResult<StatusCounts> {
        let pending = self.count(OrderStatus::Pending).await?;
        let in_picking = self.count(OrderStatus::InPicking).await?;
        let prepared = self.count(OrderStatus::Prepared).await?;

        Ok(StatusCounts {
            pending,
            in_picking,
            prepared,
        })
    }

    async fn count(&self, status: OrderStatus) -> ApiResult<usize> {
        Ok(self.store.query_orders_by_status(status).await?.len())
    }

    async fn delivery_offsets(&self) -> ApiResult<(i64, i64)> {
        let urgent = self
            .config
            .get_urgent_delivery_days()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let routine = self
            .config
            .get_routine_delivery_days()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok((urgent, routine))
    }

    fn to_overview(order: &Order, urgent_days: i64, routine_days: i64) -> ApiResult<OrderOverview> {
        let estimated_delivery = order
            .estimated_delivery_date(urgent_days, routine_days)
            .ok_or_else(|| {
                error!(order_id = %order.order_id, urgent_days, routine_days, "预计送达日期超出范围");
                ApiError::ConfigError(format!(
                    "订单{}的预计送达日期超出范围 (加急{}天, 常规{}天)",
                    order.order_id, urgent_days, routine_days
                ))
            })?;

        Ok(OrderOverview {
            order_id: order.order_id.clone(),
            order_number: order.order_number.clone(),
            customer_id: order.customer.customer_id.clone(),
            customer_name: order.customer.name.clone(),
            route: order.route.clone(),
            status: order.status,
            status_label: i18n::status_label(order.status),
            priority: order.priority,
            priority_label: i18n::priority_label(order.priority),
            ordered_at: order.ordered_at,
            estimated_delivery,
            total_items: order.total_items(),
            total_articles: order.total_articles(),
            percent: order_percent(order),
        })
    }
}
