// ==========================================
// 仓库拣货核心 - 操作日志领域模型
// ==========================================
// 红线: 所有成功的状态/拣货写入必须记录
// 用途: 审计追踪
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,         // 日志ID (UUID)
    pub action_type: String,       // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,  // 操作时间戳
    pub actor: String,             // 操作人

    // ===== 关联实体 =====
    pub order_id: Option<String>,  // 关联订单
    pub line_id: Option<String>,   // 关联订单行

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    StartPicking,  // 批量转入拣货
    PickLine,      // 行标记已拣
    UnpickLine,    // 行取消已拣
    CompleteOrder, // 订单备货完成
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::StartPicking => "StartPicking",
            ActionType::PickLine => "PickLine",
            ActionType::UnpickLine => "UnpickLine",
            ActionType::CompleteOrder => "CompleteOrder",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "StartPicking" => Some(ActionType::StartPicking),
            "PickLine" => Some(ActionType::PickLine),
            "UnpickLine" => Some(ActionType::UnpickLine),
            "CompleteOrder" => Some(ActionType::CompleteOrder),
            _ => None,
        }
    }

    /// 拣货标记写入对应的操作类型
    pub fn for_pick_flag(flag: bool) -> Self {
        if flag {
            ActionType::PickLine
        } else {
            ActionType::UnpickLine
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志(自动生成 action_id 与时间戳)
    pub fn new(action_type: ActionType, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            order_id: None,
            line_id: None,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_order(mut self, order_id: &str) -> Self {
        self.order_id = Some(order_id.to_string());
        self
    }

    pub fn with_line(mut self, line_id: &str) -> Self {
        self.line_id = Some(line_id.to_string());
        self
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_roundtrip() {
        for t in [
            ActionType::StartPicking,
            ActionType::PickLine,
            ActionType::UnpickLine,
            ActionType::CompleteOrder,
        ] {
            assert_eq!(ActionType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(ActionType::for_pick_flag(true), ActionType::PickLine);
        assert_eq!(ActionType::for_pick_flag(false), ActionType::UnpickLine);
    }

    #[test]
    fn test_builder_sets_fields() {
        let log = ActionLog::new(ActionType::CompleteOrder, "picker-1")
            .with_order("O1")
            .with_payload(&serde_json::json!({"to": "PREPARED"}));

        assert_eq!(log.action_type, "CompleteOrder");
        assert_eq!(log.order_id.as_deref(), Some("O1"));
        assert!(log.line_id.is_none());
        assert_eq!(log.payload_json.unwrap()["to"], "PREPARED");
    }
}
