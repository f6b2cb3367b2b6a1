// ==========================================
// 仓库拣货核心 - 选择/交接 API
// ==========================================
// 职责: 待处理订单列表 + 会话级选择集 + 批量转入拣货
// 红线: 批量写入成功前不修改本地视图与选择集
// 红线: 空选择集不发起任何写入
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::picking_api::PickingApi;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::order::Order;
use crate::domain::selection::{PickingHandoff, SelectionSet};
use crate::domain::types::OrderStatus;
use crate::engine::picking_state::PickingStateMachine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::order_repo::OrderStore;

#[derive(Debug, Default)]
struct SelectionState {
    pending: Vec<Order>,
    selection: SelectionSet,
}

impl SelectionState {
    fn is_candidate(&self, order_id: &str) -> bool {
        self.pending.iter().any(|o| o.order_id == order_id)
    }
}

// ==========================================
// SelectionApi - 选择/交接 API
// ==========================================
pub struct SelectionApi {
    store: Arc<dyn OrderStore>,
    action_log_repo: Arc<ActionLogRepository>,
    state_machine: PickingStateMachine,
    actor: String,
    state: RwLock<SelectionState>,
}

impl SelectionApi {
    /// 创建新的SelectionApi实例
    pub fn new(
        store: Arc<dyn OrderStore>,
        action_log_repo: Arc<ActionLogRepository>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            action_log_repo,
            state_machine: PickingStateMachine::new(),
            actor: actor.into(),
            state: RwLock::new(SelectionState::default()),
        }
    }

    // ==========================================
    // 待处理列表
    // ==========================================

    /// 加载 Pending 订单
    ///
    /// 读取失败时保留原列表; 成功后剔除选择集中已不在列表里的ID
    pub async fn load_pending(&self) -> ApiResult<Vec<Order>> {
        let orders = self
            .store
            .query_orders_by_status(OrderStatus::Pending)
            .await
            .map_err(|e| {
                error!(error = %e, "待处理订单加载失败");
                ApiError::from(e)
            })?;

        let mut state = self.state.write().await;
        let ids: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        let stale: Vec<String> = state
            .selection
            .iter()
            .filter(|id| !ids.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &stale {
            state.selection.remove(id);
        }
        state.pending = orders;

        info!(
            pending = state.pending.len(),
            dropped_selection = stale.len(),
            "待处理订单已加载"
        );
        Ok(state.pending.clone())
    }

    /// 当前待处理列表快照
    pub async fn pending_orders(&self) -> Vec<Order> {
        self.state.read().await.pending.clone()
    }

    // ==========================================
    // 选择集
    // ==========================================

    /// 翻转单个订单的选中状态
    ///
    /// 不在待处理列表中的ID被忽略,返回 false
    pub async fn toggle_select(&self, order_id: &str) -> bool {
        let mut state = self.state.write().await;
        if !state.is_candidate(order_id) {
            debug!(order_id, "订单不在待处理列表中，忽略选择");
            return false;
        }
        state.selection.toggle(order_id)
    }

    /// 全选候选订单（与现有选择取并集）
    ///
    /// # 返回
    /// 新加入选择集的数量
    pub async fn select_all(&self, candidate_ids: &[String]) -> usize {
        let mut state = self.state.write().await;
        let mut added = 0;
        for id in candidate_ids {
            if state.is_candidate(id) && state.selection.insert(id) {
                added += 1;
            }
        }
        added
    }

    /// 取消选择候选订单（其余选择保留）
    pub async fn deselect_all(&self, candidate_ids: &[String]) -> usize {
        let mut state = self.state.write().await;
        candidate_ids
            .iter()
            .filter(|id| state.selection.remove(id))
            .count()
    }

    /// 清空选择集
    pub async fn clear_all(&self) {
        self.state.write().await.selection.clear();
    }

    /// 当前选择集快照
    pub async fn selection(&self) -> SelectionSet {
        self.state.read().await.selection.clone()
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交当前选择集
    pub async fn commit_selection(&self) -> ApiResult<Option<PickingHandoff>> {
        let selection = self.selection().await;
        self.commit(selection).await
    }

    /// 将选择集批量转入 InPicking
    ///
    /// # 返回
    /// - Ok(None): 空选择集,未发起写入
    /// - Ok(Some(handoff)): 写入成功,已从待处理列表移除并清出选择集
    /// - Err(ApiError): 写入失败,本地视图与选择集不变
    pub async fn commit(&self, selection: SelectionSet) -> ApiResult<Option<PickingHandoff>> {
        if selection.is_empty() {
            debug!("选择集为空，不提交");
            return Ok(None);
        }

        let ids = selection.to_vec();
        let target = self.state_machine.start_picking_target();

        let updated = self
            .store
            .bulk_update_order_status(&ids, target)
            .await
            .map_err(|e| {
                error!(count = ids.len(), error = %e, "批量转入拣货失败");
                ApiError::from(e)
            })?;

        {
            let mut state = self.state.write().await;
            state.pending.retain(|o| !selection.contains(&o.order_id));
            for id in &ids {
                state.selection.remove(id);
            }
        }

        info!(count = updated, to = %target, "订单已转入拣货");

        let logs: Vec<ActionLog> = ids
            .iter()
            .map(|id| {
                ActionLog::new(ActionType::StartPicking, &self.actor)
                    .with_order(id)
                    .with_payload(&json!({
                        "from": OrderStatus::Pending.to_db_str(),
                        "to": target.to_db_str(),
                        "batch_size": ids.len(),
                    }))
            })
            .collect();
        if let Err(e) = self.action_log_repo.batch_insert(logs) {
            warn!(error = %e, "操作日志写入失败");
        }

        Ok(Some(PickingHandoff::new(selection)))
    }

    /// 提交并打开拣货视图
    ///
    /// # 返回
    /// - Ok(None): 空选择集
    /// - Ok(Some(orders)): 拣货视图加载后的活动订单
    pub async fn commit_and_open(&self, picking: &PickingApi) -> ApiResult<Option<Vec<Order>>> {
        match self.commit_selection().await? {
            Some(handoff) => Ok(Some(picking.open_handoff(&handoff).await?)),
            None => Ok(None),
        }
    }

    /// 最近转入拣货的记录（最新在前）
    pub async fn recent_handoffs(&self, limit: i32) -> ApiResult<Vec<ActionLog>> {
        Ok(self
            .action_log_repo
            .find_by_action_type(ActionType::StartPicking.as_str(), limit)?)
    }
}
