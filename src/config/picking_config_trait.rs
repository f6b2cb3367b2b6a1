// ==========================================
// 仓库拣货核心 - 拣货配置读取 Trait
// ==========================================
// 职责: 定义拣货/仓库视图所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// PickingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PickingConfigReader: Send + Sync {
    /// 加急订单预计送达偏移天数
    ///
    /// # 默认值
    /// - 1（次日送达）
    async fn get_urgent_delivery_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>>;

    /// 常规订单预计送达偏移天数
    ///
    /// # 默认值
    /// - 3
    async fn get_routine_delivery_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>>;

    /// 审计日志中的默认操作人
    ///
    /// # 默认值
    /// - "warehouse"
    async fn get_picking_actor(&self) -> Result<String, Box<dyn Error + Send + Sync>>;
}
