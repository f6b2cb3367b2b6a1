// ==========================================
// 仓库拣货核心 - 拣货视图 API
// ==========================================
// 职责: 对交接过来的订单批次执行 加载 → 切换 → 聚合 → 转换 → 持久化 循环
// 红线: 写后确认,本地视图只在存储确认成功后修改,绝不乐观更新
// 红线: 完成转换边沿触发,同一订单最多触发一次
// ==========================================
// 并发: 本地视图置于 RwLock 中,等待存储期间不持锁;
//       不同订单行的切换可以交错发起与完成
// ==========================================

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::order::Order;
use crate::domain::selection::PickingHandoff;
use crate::domain::types::OrderStatus;
use crate::engine::picking_state::PickingStateMachine;
use crate::engine::progress::{batch_progress, line_progress, BatchProgress, LineProgress};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::error::RepositoryError;
use crate::repository::order_repo::OrderStore;

// ==========================================
// 返回类型
// ==========================================

/// 完成评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum CompletionOutcome {
    /// 仍有待拣行（或订单不在 InPicking）
    NotReady,
    /// 已转为 Prepared 并移出活动视图
    Completed,
    /// 状态写入失败,订单保留在视图中
    Failed { reason: String },
    /// 订单已被其他会话推进,移出活动视图
    Removed,
}

/// 单行切换结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineToggleOutcome {
    pub line_id: String,
    pub order_id: String,
    pub picked: bool,
    /// 切换后订单进度（订单已移出视图时为 None）
    pub order_progress: Option<LineProgress>,
    pub completion: CompletionOutcome,
}

/// 批量标记已拣结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkLinesResult {
    pub picked: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
    pub completed_orders: Vec<String>,
}

/// 完成触发来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletionTrigger {
    Auto,
    Manual,
}

impl CompletionTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            CompletionTrigger::Auto => "auto",
            CompletionTrigger::Manual => "manual",
        }
    }
}

/// 活动批次视图
#[derive(Debug, Default)]
struct PickingView {
    orders: Vec<Order>,
    /// 状态写入进行中的订单
    completing: HashSet<String>,
    /// 每个订单的本地修改计数; 刷新读取期间计数变化则丢弃该次读取
    versions: HashMap<String, u64>,
}

impl PickingView {
    fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    fn order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.order_id == order_id)
    }

    fn parent_of(&self, line_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.contains_line(line_id))
    }

    fn version(&self, order_id: &str) -> u64 {
        self.versions.get(order_id).copied().unwrap_or(0)
    }

    fn bump(&mut self, order_id: &str) {
        *self.versions.entry(order_id.to_string()).or_insert(0) += 1;
    }

    fn remove(&mut self, order_id: &str) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.order_id != order_id);
        self.orders.len() != before
    }
}

// ==========================================
// PickingApi - 拣货视图 API
// ==========================================

/// 拣货视图API
///
/// 职责：
/// 1. 按交接的订单ID加载 InPicking 订单明细
/// 2. 行拣货切换（写后确认）
/// 3. 订单完成检测与 InPicking → Prepared 转换
/// 4. 提供批次/订单进度读取
pub struct PickingApi {
    store: Arc<dyn OrderStore>,
    action_log_repo: Arc<ActionLogRepository>,
    state_machine: PickingStateMachine,
    actor: String,
    view: RwLock<PickingView>,
}

impl PickingApi {
    /// 创建新的PickingApi实例
    ///
    /// # 参数
    /// - store: 订单存储
    /// - action_log_repo: 操作日志仓储
    /// - actor: 审计日志中的操作人
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
            view: RwLock::new(PickingView::default()),
        }
    }

    // ==========================================
    // 加载
    // ==========================================

    /// 按交接载荷加载批次
    pub async fn open_handoff(&self, handoff: &PickingHandoff) -> ApiResult<Vec<Order>> {
        self.load_batch(&handoff.order_ids()).await
    }

    /// 加载批次
    ///
    /// # 参数
    /// - order_ids: 订单ID列表（重复ID合并）
    ///
    /// # 返回
    /// - Ok(Vec<Order>): 加载并完成首次评估后的活动订单（按路线排序）
    /// - Err(ApiError): 读取失败,视图保持原内容
    ///
    /// # 说明
    /// - 空列表为 no-op
    /// - 已离开 InPicking 的ID静默排除
    /// - 加载后立即评估完成性: 零行订单在此触发完成转换
    pub async fn load_batch(&self, order_ids: &[String]) -> ApiResult<Vec<Order>> {
        let ids: Vec<String> = order_ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if ids.is_empty() {
            debug!("load_batch: 空ID列表，忽略");
            return Ok(Vec::new());
        }

        let orders = self
            .store
            .query_orders_by_ids(&ids, Some(OrderStatus::InPicking))
            .await
            .map_err(|e| {
                error!(error = %e, requested = ids.len(), "拣货批次加载失败");
                ApiError::from(e)
            })?;

        if orders.len() < ids.len() {
            debug!(
                requested = ids.len(),
                loaded = orders.len(),
                "部分订单已不在拣货中，已排除"
            );
        }

        let loaded = orders.len();
        let candidates: Vec<String> = {
            let mut view = self.view.write().await;
            for order in &orders {
                view.bump(&order.order_id);
            }
            view.orders = orders;
            view.orders
                .iter()
                .filter(|o| self.state_machine.completion_target(o).is_some())
                .map(|o| o.order_id.clone())
                .collect()
        };

        info!(loaded, ready = candidates.len(), "拣货批次已加载");

        for order_id in candidates {
            self.try_complete(&order_id, CompletionTrigger::Auto).await;
        }

        Ok(self.active_orders().await)
    }

    // ==========================================
    // 行切换
    // ==========================================

    /// 切换单行拣货标记
    ///
    /// # 参数
    /// - line_id: 订单行ID
    /// - current_flag: 操作员看到的当前标记（持久化其取反值）
    ///
    /// # 返回
    /// - Ok(LineToggleOutcome): 写入已确认
    /// - Err(ApiError): 行不在活动批次中,或写入失败（本地状态不变）
    pub async fn toggle_line(&self, line_id: &str, current_flag: bool) -> ApiResult<LineToggleOutcome> {
        let order_id = {
            let view = self.view.read().await;
            view.parent_of(line_id)
                .map(|o| o.order_id.clone())
                .ok_or_else(|| ApiError::NotFound(format!("订单行{}不在当前拣货批次中", line_id)))?
        };

        let new_flag = !current_flag;

        // 1. 持久化（失败则本地不变）
        if let Err(e) = self.store.update_line_pick_flag(line_id, new_flag).await {
            error!(line_id, order_id = %order_id, picked = new_flag, error = %e, "拣货标记写入失败");
            return Err(e.into());
        }

        self.record(
            ActionLog::new(ActionType::for_pick_flag(new_flag), &self.actor)
                .with_order(&order_id)
                .with_line(line_id)
                .with_payload(&json!({ "picked": new_flag })),
        );

        // 2. 确认后只更新该行
        {
            let mut view = self.view.write().await;
            if let Some(line) = view
                .order_mut(&order_id)
                .and_then(|o| o.lines.iter_mut().find(|l| l.line_id == line_id))
            {
                line.picked = new_flag;
            }
            view.bump(&order_id);
        }
        debug!(line_id, order_id = %order_id, picked = new_flag, "拣货标记已确认");

        // 3. 以存储为准刷新父订单后评估完成性
        let completion = match self.refresh_order(&order_id).await {
            RefreshResult::Gone => CompletionOutcome::Removed,
            RefreshResult::Refreshed | RefreshResult::Stale => {
                self.try_complete(&order_id, CompletionTrigger::Auto).await
            }
        };

        let order_progress = self.order_progress(&order_id).await;

        Ok(LineToggleOutcome {
            line_id: line_id.to_string(),
            order_id,
            picked: new_flag,
            order_progress,
            completion,
        })
    }

    /// 批量标记已拣
    ///
    /// 每行一次独立写入; 已拣行跳过; 不在批次中的行计为失败
    pub async fn mark_lines_picked(&self, line_ids: &[String]) -> ApiResult<MarkLinesResult> {
        let mut result = MarkLinesResult::default();
        let mut to_pick = Vec::new();

        {
            let view = self.view.read().await;
            let unique: BTreeSet<&String> = line_ids.iter().collect();
            for line_id in unique {
                match view.parent_of(line_id).and_then(|o| o.line(line_id)) {
                    Some(line) if line.picked => result.skipped.push(line_id.clone()),
                    Some(_) => to_pick.push(line_id.clone()),
                    None => result
                        .failed
                        .push((line_id.clone(), "不在当前拣货批次中".to_string())),
                }
            }
        }

        let outcomes = join_all(to_pick.iter().map(|line_id| self.toggle_line(line_id, false))).await;

        for (line_id, outcome) in to_pick.into_iter().zip(outcomes) {
            match outcome {
                Ok(o) => {
                    if o.completion == CompletionOutcome::Completed {
                        result.completed_orders.push(o.order_id.clone());
                    }
                    result.picked.push(line_id);
                }
                Err(e) => result.failed.push((line_id, e.to_string())),
            }
        }

        info!(
            picked = result.picked.len(),
            skipped = result.skipped.len(),
            failed = result.failed.len(),
            completed = result.completed_orders.len(),
            "批量标记已拣完成"
        );
        Ok(result)
    }

    // ==========================================
    // 完成
    // ==========================================

    /// 人工完成订单（"完成"按钮）
    ///
    /// 不绕过"所有行已拣"要求: 先以存储为准刷新订单再校验
    pub async fn manual_complete(&self, order_id: &str) -> ApiResult<()> {
        {
            let view = self.view.read().await;
            if view.order(order_id).is_none() {
                return Err(ApiError::NotFound(format!("订单{}不在当前拣货批次中", order_id)));
            }
            if view.completing.contains(order_id) {
                return Err(ApiError::BusinessRuleViolation(format!(
                    "订单{}正在完成中",
                    order_id
                )));
            }
        }

        let version = self.view.read().await.version(order_id);
        let fresh = self
            .store
            .query_orders_by_ids(&[order_id.to_string()], None)
            .await
            .map_err(|e| {
                error!(order_id, error = %e, "人工完成前刷新订单失败");
                ApiError::from(e)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("订单{}不存在", order_id)))?;

        if let Err(e) = self.state_machine.validate_manual_completion(&fresh) {
            return Err(match e {
                RepositoryError::BusinessRuleViolation(_) => {
                    let progress = line_progress(&fresh);
                    let err = ApiError::OrderNotComplete {
                        order_id: order_id.to_string(),
                        picked: progress.picked,
                        total: progress.total,
                    };
                    warn!(order_id, message = %err.user_message(), "人工完成被拒绝");
                    err
                }
                other => {
                    if fresh.status != OrderStatus::InPicking {
                        self.view.write().await.remove(order_id);
                    }
                    other.into()
                }
            });
        }

        {
            let mut view = self.view.write().await;
            if view.version(order_id) == version {
                if let Some(order) = view.order_mut(order_id) {
                    *order = fresh;
                }
            }
        }

        match self.try_complete(order_id, CompletionTrigger::Manual).await {
            CompletionOutcome::Completed | CompletionOutcome::Removed => Ok(()),
            CompletionOutcome::Failed { reason } => Err(ApiError::DatabaseError(reason)),
            CompletionOutcome::NotReady => Err(ApiError::BusinessRuleViolation(format!(
                "订单{}正在完成中",
                order_id
            ))),
        }
    }

    /// 尝试执行 InPicking → Prepared
    ///
    /// 评估使用视图中的当前（写后）状态; completing 集合保证同一订单只发起一次状态写入
    async fn try_complete(&self, order_id: &str, trigger: CompletionTrigger) -> CompletionOutcome {
        let target = {
            let mut view = self.view.write().await;
            if view.completing.contains(order_id) {
                return CompletionOutcome::NotReady;
            }
            let target = match view.order(order_id) {
                Some(order) => self.state_machine.completion_target(order),
                None => return CompletionOutcome::Removed,
            };
            match target {
                Some(target) => {
                    view.completing.insert(order_id.to_string());
                    target
                }
                None => return CompletionOutcome::NotReady,
            }
        };

        let written = self.store.update_order_status(order_id, target).await;

        let mut view = self.view.write().await;
        view.completing.remove(order_id);

        match written {
            Ok(()) => {
                view.remove(order_id);
                drop(view);
                info!(order_id, to = %target, trigger = trigger.as_str(), "订单拣货完成");
                self.record(
                    ActionLog::new(ActionType::CompleteOrder, &self.actor)
                        .with_order(order_id)
                        .with_payload(&json!({
                            "from": OrderStatus::InPicking.to_db_str(),
                            "to": target.to_db_str(),
                            "trigger": trigger.as_str(),
                        })),
                );
                CompletionOutcome::Completed
            }
            Err(e) => {
                error!(order_id, to = %target, error = %e, "订单完成状态写入失败");
                CompletionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 当前活动订单快照
    pub async fn active_orders(&self) -> Vec<Order> {
        self.view.read().await.orders.clone()
    }

    /// 批次进度（常驻进度条）
    pub async fn batch_progress(&self) -> BatchProgress {
        batch_progress(&self.view.read().await.orders)
    }

    /// 订单的操作记录（按时间先后）
    pub async fn order_history(&self, order_id: &str) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_by_order_id(order_id)?)
    }

    /// 最近的操作记录（最新在前）
    pub async fn recent_activity(&self, limit: i32) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_recent(limit)?)
    }

    /// 单个订单进度（订单卡片进度条）
    pub async fn order_progress(&self, order_id: &str) -> Option<LineProgress> {
        self.view.read().await.order(order_id).map(line_progress)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 从存储刷新单个订单
    ///
    /// 读取期间本地有新的确认写入时丢弃读取结果, 以本地状态评估
    async fn refresh_order(&self, order_id: &str) -> RefreshResult {
        let version = self.view.read().await.version(order_id);
        match self
            .store
            .query_orders_by_ids(&[order_id.to_string()], Some(OrderStatus::InPicking))
            .await
        {
            Ok(orders) => {
                let mut view = self.view.write().await;
                match orders.into_iter().next() {
                    Some(fresh) => {
                        if view.version(order_id) != version {
                            debug!(order_id, "刷新期间订单已有新的确认写入，丢弃读取结果");
                            return RefreshResult::Stale;
                        }
                        if let Some(order) = view.order_mut(order_id) {
                            *order = fresh;
                        }
                        RefreshResult::Refreshed
                    }
                    None => {
                        // 其他会话（或并发的完成）已推进该订单
                        if view.completing.contains(order_id) {
                            RefreshResult::Refreshed
                        } else {
                            view.remove(order_id);
                            debug!(order_id, "订单已离开拣货中状态，移出视图");
                            RefreshResult::Gone
                        }
                    }
                }
            }
            Err(e) => {
                warn!(order_id, error = %e, "刷新订单失败，使用本地状态评估");
                RefreshResult::Stale
            }
        }
    }

    /// 写入审计日志（失败只告警，不回滚业务写入）
    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(action_type = %log.action_type, error = %e, "操作日志写入失败");
        }
    }
}

enum RefreshResult {
    Refreshed,
    Stale,
    Gone,
}
