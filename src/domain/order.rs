// ==========================================
// 仓库拣货核心 - 订单领域模型
// ==========================================
// 职责: 订单、订单行、产品/客户展示信息
// 红线: 订单独占订单行,本核心只修改 status 与 picked
// ==========================================

use crate::domain::types::{DeliveryPriority, OrderStatus};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// CustomerRef - 客户引用(只读展示)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub customer_id: String,     // 客户ID
    pub name: Option<String>,    // 客户名称
    pub address: Option<String>, // 送货地址
}

// ==========================================
// ProductInfo - 产品展示信息(只读)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: String,
    pub name: String,
    pub format: Option<String>,    // 包装规格
    pub image_url: Option<String>, // 图片地址
}

// ==========================================
// OrderLine - 订单行
// ==========================================
// 红线: quantity > 0; picked 是唯一可变字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub order_id: String, // 所属订单(FK)
    pub product: ProductInfo,
    pub quantity: u32,
    pub picked: bool, // 拣货标记: false=待拣 true=已拣
}

// ==========================================
// Order - 订单
// ==========================================
// 对齐: orders 表 + order_lines 表(按 position 排序)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    // ===== 主键 =====
    pub order_id: String,
    pub order_number: String, // 订单号(唯一,仅展示)

    // ===== 业务属性 =====
    pub customer: CustomerRef,
    pub route: String, // 配送路线
    pub status: OrderStatus,
    pub ordered_at: NaiveDateTime,
    pub priority: DeliveryPriority,
    pub notes: Option<String>,

    // ===== 订单行(有序) =====
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// 行数
    pub fn total_items(&self) -> usize {
        self.lines.len()
    }

    /// 件数(各行数量之和)
    pub fn total_articles(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// 查找订单行
    pub fn line(&self, line_id: &str) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// 是否包含指定行
    pub fn contains_line(&self, line_id: &str) -> bool {
        self.line(line_id).is_some()
    }

    /// 预计送达日期
    ///
    /// # 参数
    /// - urgent_days: 加急订单偏移天数
    /// - routine_days: 常规订单偏移天数
    ///
    /// # 返回
    /// 偏移后超出日期范围时返回 None
    pub fn estimated_delivery_date(&self, urgent_days: i64, routine_days: i64) -> Option<NaiveDate> {
        let offset = match self.priority {
            DeliveryPriority::Urgent => urgent_days,
            DeliveryPriority::Routine => routine_days,
        };
        let offset = Duration::try_days(offset)?;
        self.ordered_at.date().checked_add_signed(offset)
    }
}
