// ==========================================
// 仓库拣货核心 - 拣货状态机
// ==========================================
// 状态: Pending → InPicking → Prepared → InDelivery → Delivered
// ==========================================
// 转换规则:
// - Pending → InPicking: 提交选择集时批量触发(与单订单原状态无关)
// - InPicking → Prepared: 边沿触发,完成最后一个待拣行的那次切换中触发一次
// - Prepared → InDelivery → Delivered: 外部配送流程驱动,本核心只识别不触发
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::OrderStatus;
use crate::engine::progress::is_order_complete;
use crate::repository::error::{RepositoryError, RepositoryResult};

/// 拣货状态机(无状态规则对象)
#[derive(Debug, Clone, Copy, Default)]
pub struct PickingStateMachine;

impl PickingStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// 顺序上的下一阶段
    pub fn next_status(&self, status: OrderStatus) -> Option<OrderStatus> {
        match status {
            OrderStatus::Pending => Some(OrderStatus::InPicking),
            OrderStatus::InPicking => Some(OrderStatus::Prepared),
            OrderStatus::Prepared => Some(OrderStatus::InDelivery),
            OrderStatus::InDelivery => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// 是否为合法的单步转换
    pub fn can_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.next_status(from) == Some(to)
    }

    /// 校验单步转换
    pub fn validate_transition(&self, from: OrderStatus, to: OrderStatus) -> RepositoryResult<()> {
        if self.can_transition(from, to) {
            Ok(())
        } else {
            Err(RepositoryError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// 批量开始拣货的目标状态
    ///
    /// 不校验原状态: 已在 InPicking 的订单重复提交不受影响
    pub fn start_picking_target(&self) -> OrderStatus {
        OrderStatus::InPicking
    }

    /// 完成评估
    ///
    /// 仅当订单处于 InPicking 且所有行已拣时返回 Some(Prepared)。
    /// Pending 订单即使行已全部拣完也不会被推进。
    pub fn completion_target(&self, order: &Order) -> Option<OrderStatus> {
        if order.status == OrderStatus::InPicking && is_order_complete(order) {
            Some(OrderStatus::Prepared)
        } else {
            None
        }
    }

    /// 人工完成校验(不绕过"所有行已拣"的要求)
    pub fn validate_manual_completion(&self, order: &Order) -> RepositoryResult<OrderStatus> {
        self.validate_transition(order.status, OrderStatus::Prepared)?;
        self.completion_target(order).ok_or_else(|| {
            RepositoryError::BusinessRuleViolation(format!(
                "订单{}仍有待拣行,不能完成",
                order.order_number
            ))
        })
    }
}
