// ==========================================
// 仓库拣货核心 - API 层
// ==========================================
// 职责: 提供选择/拣货/总览业务接口
// ==========================================

pub mod error;
pub mod picking_api;
pub mod selection_api;
pub mod warehouse_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use picking_api::{CompletionOutcome, LineToggleOutcome, MarkLinesResult, PickingApi};
pub use selection_api::SelectionApi;
pub use warehouse_api::{OrderOverview, StatusCounts, WarehouseApi};
