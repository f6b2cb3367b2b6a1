// ==========================================
// 仓库拣货核心 - 引擎层
// ==========================================
// 职责: 实现拣货业务规则,不拼 SQL
// 红线: Engine 不访问数据库,只对内存中的订单做判定
// ==========================================

pub mod picking_state;
pub mod progress;

// 重导出核心引擎
pub use picking_state::PickingStateMachine;
pub use progress::{
    batch_progress, is_order_complete, line_progress, order_percent, BatchProgress, LineProgress,
};
