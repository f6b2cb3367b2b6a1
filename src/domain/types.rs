// ==========================================
// 仓库拣货核心 - 领域类型定义
// ==========================================
// 订单状态: Pending → InPicking → Prepared → InDelivery → Delivered
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 顺序即履约阶段顺序,派生 Ord 用于阶段比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,    // 待处理
    InPicking,  // 拣货中
    Prepared,   // 已备货(装车区)
    InDelivery, // 配送中
    Delivered,  // 已送达
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OrderStatus {
    /// 全部状态(按阶段顺序)
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::InPicking,
        OrderStatus::Prepared,
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
    ];

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InPicking => "IN_PICKING",
            OrderStatus::Prepared => "PREPARED",
            OrderStatus::InDelivery => "IN_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    /// 从数据库字符串解析
    ///
    /// 未知值返回 None,由调用方决定如何报错(不做静默默认)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(OrderStatus::Pending),
            "IN_PICKING" => Some(OrderStatus::InPicking),
            "PREPARED" => Some(OrderStatus::Prepared),
            "IN_DELIVERY" => Some(OrderStatus::InDelivery),
            "DELIVERED" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// 业务标签(仓库现场使用的西语标签)
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::InPicking => "En Picking",
            OrderStatus::Prepared => "Preparado",
            OrderStatus::InDelivery => "En Reparto",
            OrderStatus::Delivered => "Entregado",
        }
    }

    /// 从业务标签解析
    ///
    /// "En Playa" 是旧界面对备货完成状态的叫法,统一归为 Prepared
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Pendiente" => Some(OrderStatus::Pending),
            "En Picking" => Some(OrderStatus::InPicking),
            "Preparado" | "En Playa" => Some(OrderStatus::Prepared),
            "En Reparto" => Some(OrderStatus::InDelivery),
            "Entregado" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }

    /// i18n 键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "order_status.pending",
            OrderStatus::InPicking => "order_status.in_picking",
            OrderStatus::Prepared => "order_status.prepared",
            OrderStatus::InDelivery => "order_status.in_delivery",
            OrderStatus::Delivered => "order_status.delivered",
        }
    }
}

// ==========================================
// 配送优先级 (Delivery Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryPriority {
    Urgent,  // 加急(次日送达)
    Routine, // 常规
}

impl fmt::Display for DeliveryPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl DeliveryPriority {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeliveryPriority::Urgent => "URGENT",
            DeliveryPriority::Routine => "ROUTINE",
        }
    }

    /// 从数据库字符串解析(兼容 urgente/habitual 旧值)
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "urgent" | "urgente" => Some(DeliveryPriority::Urgent),
            "routine" | "habitual" => Some(DeliveryPriority::Routine),
            _ => None,
        }
    }

    /// 业务标签
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryPriority::Urgent => "urgente",
            DeliveryPriority::Routine => "habitual",
        }
    }

    /// i18n 键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            DeliveryPriority::Urgent => "priority.urgent",
            DeliveryPriority::Routine => "priority.routine",
        }
    }
}
