// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use warehouse_picking::api::{PickingApi, SelectionApi, WarehouseApi};
use warehouse_picking::config::ConfigManager;
use warehouse_picking::domain::order::Order;
use warehouse_picking::domain::types::OrderStatus;
use warehouse_picking::repository::{
    ActionLogRepository, OrderRepository, OrderStore, RepositoryError, RepositoryResult,
};

// ==========================================
// InstrumentedStore - 可计数/可注入失败的存储
// ==========================================

/// 包装真实仓储,记录写入次数并按需注入失败或延迟
pub struct InstrumentedStore {
    inner: Arc<OrderRepository>,
    status_writes: Mutex<Vec<(String, OrderStatus)>>,
    line_writes: Mutex<Vec<(String, bool)>>,
    bulk_writes: Mutex<Vec<Vec<String>>>,
    reads: Mutex<usize>,
    fail_line_writes: AtomicBool,
    fail_status_writes: AtomicBool,
    fail_bulk_writes: AtomicBool,
    fail_reads: AtomicBool,
    line_delays: Mutex<HashMap<String, Duration>>,
    status_delay: Mutex<Option<Duration>>,
    next_read_delay: Mutex<Option<Duration>>,
}

impl InstrumentedStore {
    pub fn new(inner: Arc<OrderRepository>) -> Self {
        Self {
            inner,
            status_writes: Mutex::new(Vec::new()),
            line_writes: Mutex::new(Vec::new()),
            bulk_writes: Mutex::new(Vec::new()),
            reads: Mutex::new(0),
            fail_line_writes: AtomicBool::new(false),
            fail_status_writes: AtomicBool::new(false),
            fail_bulk_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            line_delays: Mutex::new(HashMap::new()),
            status_delay: Mutex::new(None),
            next_read_delay: Mutex::new(None),
        }
    }

    // ===== 故障注入 =====

    pub fn fail_line_writes(&self, fail: bool) {
        self.fail_line_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_bulk_writes(&self, fail: bool) {
        self.fail_bulk_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn delay_line(&self, line_id: &str, delay: Duration) {
        self.line_delays
            .lock()
            .unwrap()
            .insert(line_id.to_string(), delay);
    }

    pub fn delay_status_writes(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = Some(delay);
    }

    /// 下一次按ID读取: 先取快照再等待,返回的是等待前的数据
    pub fn delay_next_read(&self, delay: Duration) {
        *self.next_read_delay.lock().unwrap() = Some(delay);
    }

    // ===== 观测 =====

    /// 成功的订单状态写入
    pub fn status_writes(&self) -> Vec<(String, OrderStatus)> {
        self.status_writes.lock().unwrap().clone()
    }

    pub fn status_writes_for(&self, order_id: &str) -> usize {
        self.status_writes()
            .iter()
            .filter(|(id, _)| id == order_id)
            .count()
    }

    /// 成功的行标记写入
    pub fn line_writes(&self) -> Vec<(String, bool)> {
        self.line_writes.lock().unwrap().clone()
    }

    /// 批量写入调用（含失败调用）
    pub fn bulk_writes(&self) -> Vec<Vec<String>> {
        self.bulk_writes.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    fn injected(what: &str) -> RepositoryError {
        RepositoryError::DatabaseQueryError(format!("injected {} failure", what))
    }

    fn check_read(&self) -> RepositoryResult<()> {
        *self.reads.lock().unwrap() += 1;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InstrumentedStore {
    async fn query_orders_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>> {
        self.check_read()?;
        self.inner.query_orders_by_status(status).await
    }

    async fn query_orders_by_ids(
        &self,
        order_ids: &[String],
        status_filter: Option<OrderStatus>,
    ) -> RepositoryResult<Vec<Order>> {
        self.check_read()?;
        let snapshot = self.inner.query_orders_by_ids(order_ids, status_filter).await;
        let delay = self.next_read_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        snapshot
    }

    async fn update_order_status(&self, order_id: &str, new_status: OrderStatus) -> RepositoryResult<()> {
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("status write"));
        }
        self.inner.update_order_status(order_id, new_status).await?;
        self.status_writes
            .lock()
            .unwrap()
            .push((order_id.to_string(), new_status));
        Ok(())
    }

    async fn update_line_pick_flag(&self, line_id: &str, picked: bool) -> RepositoryResult<()> {
        let delay = self.line_delays.lock().unwrap().get(line_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_line_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("line write"));
        }
        self.inner.update_line_pick_flag(line_id, picked).await?;
        self.line_writes
            .lock()
            .unwrap()
            .push((line_id.to_string(), picked));
        Ok(())
    }

    async fn bulk_update_order_status(
        &self,
        order_ids: &[String],
        new_status: OrderStatus,
    ) -> RepositoryResult<usize> {
        self.bulk_writes.lock().unwrap().push(order_ids.to_vec());
        if self.fail_bulk_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("bulk write"));
        }
        self.inner.bulk_update_order_status(order_ids, new_status).await
    }
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖
pub struct ApiTestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub order_repo: Arc<OrderRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
    pub config_manager: Arc<ConfigManager>,
    pub store: Arc<InstrumentedStore>,
    pub selection_api: SelectionApi,
    pub picking_api: PickingApi,
    pub warehouse_api: WarehouseApi,
}

impl ApiTestEnv {
    /// 创建新的测试环境
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (temp_file, db_path) = test_helpers::create_test_db()?;
        let conn = test_helpers::open_shared_conn(&db_path)?;

        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn).map_err(|e| e.to_string())?);
        let store = Arc::new(InstrumentedStore::new(order_repo.clone()));

        let selection_api = SelectionApi::new(store.clone(), action_log_repo.clone(), "tester");
        let picking_api = PickingApi::new(store.clone(), action_log_repo.clone(), "tester");
        let warehouse_api = WarehouseApi::new(store.clone(), config_manager.clone());

        Ok(Self {
            _temp_file: temp_file,
            db_path,
            order_repo,
            action_log_repo,
            config_manager,
            store,
            selection_api,
            picking_api,
            warehouse_api,
        })
    }

    /// 写入测试订单
    pub fn seed(&self, orders: &[Order]) {
        test_helpers::seed_orders(&self.order_repo, orders).expect("写入测试订单失败");
    }

    /// 读取订单在数据库中的当前状态
    pub fn stored_status(&self, order_id: &str) -> OrderStatus {
        self.order_repo
            .find_by_id(order_id)
            .expect("查询失败")
            .expect("订单不存在")
            .status
    }

    /// 读取订单行在数据库中的拣货标记
    pub fn stored_picked(&self, order_id: &str, line_id: &str) -> bool {
        self.order_repo
            .find_by_id(order_id)
            .expect("查询失败")
            .expect("订单不存在")
            .line(line_id)
            .expect("订单行不存在")
            .picked
    }
}
