// ==========================================
// 仓库拣货核心 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{PickingApi, SelectionApi, WarehouseApi};
use crate::config::{ConfigManager, PickingConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{ActionLogRepository, OrderRepository, OrderStore};

/// 应用状态
///
/// 包含所有API实例和共享资源,所有仓储共用一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 订单仓储
    pub order_repo: Arc<OrderRepository>,

    /// 操作日志仓储
    pub action_log_repo: Arc<ActionLogRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 选择/交接API
    pub selection_api: Arc<SelectionApi>,

    /// 拣货视图API
    pub picking_api: Arc<PickingApi>,

    /// 仓库总览API
    pub warehouse_api: Arc<WarehouseApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动建表）
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let actor = config_manager
            .get_picking_actor()
            .await
            .map_err(|e| format!("读取操作人配置失败: {}", e))?;

        // ==========================================
        // 初始化API层
        // ==========================================
        let store: Arc<dyn OrderStore> = order_repo.clone();

        let selection_api = Arc::new(SelectionApi::new(
            store.clone(),
            action_log_repo.clone(),
            actor.clone(),
        ));
        let picking_api = Arc::new(PickingApi::new(
            store.clone(),
            action_log_repo.clone(),
            actor,
        ));
        let warehouse_api = Arc::new(WarehouseApi::new(
            store,
            config_manager.clone() as Arc<dyn PickingConfigReader>,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            order_repo,
            action_log_repo,
            config_manager,
            selection_api,
            picking_api,
            warehouse_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 WAREHOUSE_PICKING_DB_PATH,否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WAREHOUSE_PICKING_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./warehouse_picking.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("warehouse-picking-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("warehouse-picking");
        }

        // 目录创建失败时退回相对路径
        if std::fs::create_dir_all(&path).is_ok() {
            path = path.join("warehouse_picking.db");
        } else {
            path = PathBuf::from("./warehouse_picking.db");
        }
    }

    path.to_string_lossy().to_string()
}
