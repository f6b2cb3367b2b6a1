// ==========================================
// 仓库拣货核心 - 选择集与交接载荷
// ==========================================
// 职责: 操作员在待处理视图中勾选的订单集合,作为显式载荷交给拣货视图
// 红线: 会话级,不持久化; 集合语义(重复合并,无顺序意义)
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 订单选择集
///
/// 内部用 BTreeSet,批量写入时 ID 顺序稳定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 翻转成员资格,返回翻转后是否在集合中
    pub fn toggle(&mut self, order_id: &str) -> bool {
        if self.ids.remove(order_id) {
            false
        } else {
            self.ids.insert(order_id.to_string());
            true
        }
    }

    pub fn insert(&mut self, order_id: &str) -> bool {
        self.ids.insert(order_id.to_string())
    }

    pub fn remove(&mut self, order_id: &str) -> bool {
        self.ids.remove(order_id)
    }

    pub fn contains(&self, order_id: &str) -> bool {
        self.ids.contains(order_id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }

    /// 转为 ID 列表(升序)
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// ==========================================
// PickingHandoff - 选择视图 → 拣货视图的交接载荷
// ==========================================
/// 已提交(已转入 InPicking)的订单集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingHandoff {
    pub order_ids: SelectionSet,
}

impl PickingHandoff {
    pub fn new(order_ids: SelectionSet) -> Self {
        Self { order_ids }
    }

    pub fn order_ids(&self) -> Vec<String> {
        self.order_ids.to_vec()
    }
}
