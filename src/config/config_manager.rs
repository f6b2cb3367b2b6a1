// ==========================================
// 仓库拣货核心 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::picking_config_trait::PickingConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取天数配置,非法值(非数字、负数或超过上限)回退默认值
    fn get_days_or_default(&self, key: &str, default: i64) -> ConfigResult<i64> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        match value.trim().parse::<i64>() {
            Ok(days) if (0..=defaults::MAX_DELIVERY_DAYS).contains(&days) => Ok(days),
            _ => {
                tracing::warn!(config_key = key, raw_value = %value, "天数配置非法，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

// ==========================================
// PickingConfigReader Trait 实现
// ==========================================
#[async_trait]
impl PickingConfigReader for ConfigManager {
    async fn get_urgent_delivery_days(&self) -> ConfigResult<i64> {
        self.get_days_or_default(config_keys::URGENT_DELIVERY_DAYS, defaults::URGENT_DELIVERY_DAYS)
    }

    async fn get_routine_delivery_days(&self) -> ConfigResult<i64> {
        self.get_days_or_default(config_keys::ROUTINE_DELIVERY_DAYS, defaults::ROUTINE_DELIVERY_DAYS)
    }

    async fn get_picking_actor(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::PICKING_ACTOR, defaults::PICKING_ACTOR)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(defaults::PICKING_ACTOR.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 预计送达
    pub const URGENT_DELIVERY_DAYS: &str = "urgent_delivery_days";
    pub const ROUTINE_DELIVERY_DAYS: &str = "routine_delivery_days";

    // 审计
    pub const PICKING_ACTOR: &str = "picking_actor";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const URGENT_DELIVERY_DAYS: i64 = 1;
    pub const ROUTINE_DELIVERY_DAYS: i64 = 3;
    pub const PICKING_ACTOR: &str = "warehouse";
    /// 送达偏移天数上限
    pub const MAX_DELIVERY_DAYS: i64 = 365;
}
