// ==========================================
// 仓库拣货核心 - 订单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// OrderStore: 拣货核心唯一依赖的外部存储接口
// OrderRepository: 基于 SQLite 的实现
// ==========================================

mod core;


pub use core::OrderRepository;

use crate::domain::order::Order;
use crate::domain::types::OrderStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// OrderStore Trait
// ==========================================
// 实现者: OrderRepository（orders / order_lines 表）
// 说明: 每个方法是一次完整的存储往返; 只有返回 Ok 才表示存储已确认
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 按状态查询订单（内嵌客户与订单行,订单行内嵌产品展示字段）
    async fn query_orders_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>>;

    /// 按 ID 集合查询订单,可选状态过滤
    ///
    /// 不存在或不满足过滤条件的 ID 直接不出现在结果中,不报错
    async fn query_orders_by_ids(
        &self,
        order_ids: &[String],
        status_filter: Option<OrderStatus>,
    ) -> RepositoryResult<Vec<Order>>;

    /// 更新单个订单状态
    async fn update_order_status(&self, order_id: &str, new_status: OrderStatus) -> RepositoryResult<()>;

    /// 更新单行拣货标记
    async fn update_line_pick_flag(&self, line_id: &str, picked: bool) -> RepositoryResult<()>;

    /// 批量更新订单状态（全部成功或全部不生效）
    async fn bulk_update_order_status(
        &self,
        order_ids: &[String],
        new_status: OrderStatus,
    ) -> RepositoryResult<usize>;
}
