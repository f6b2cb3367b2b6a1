// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use std::error::Error;
use warehouse_picking::config::PickingConfigReader;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub urgent_delivery_days: i64,
    pub routine_delivery_days: i64,
    pub picking_actor: String,
    pub fail: bool,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            urgent_delivery_days: 1,
            routine_delivery_days: 3,
            picking_actor: "mock-picker".to_string(),
            fail: false,
        }
    }

    /// 创建自定义送达偏移
    pub fn with_offsets(urgent: i64, routine: i64) -> Self {
        let mut config = Self::default();
        config.urgent_delivery_days = urgent;
        config.routine_delivery_days = routine;
        config
    }

    /// 所有读取都失败
    pub fn failing() -> Self {
        let mut config = Self::default();
        config.fail = true;
        config
    }

    fn check(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail {
            Err("mock config unavailable".into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PickingConfigReader for MockConfig {
    async fn get_urgent_delivery_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>> {
        self.check()?;
        Ok(self.urgent_delivery_days)
    }

    async fn get_routine_delivery_days(&self) -> Result<i64, Box<dyn Error + Send + Sync>> {
        self.check()?;
        Ok(self.routine_delivery_days)
    }

    async fn get_picking_actor(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.check()?;
        Ok(self.picking_actor.clone())
    }
}
