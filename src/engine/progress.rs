// ==========================================
// 仓库拣货核心 - 拣货进度聚合
// ==========================================
// 职责: 由订单行拣货标记派生进度指标
// 红线: 纯函数,只读,无副作用
// ==========================================
// 零保护: total = 0 时百分比为 0(不是 100),
//         但零行订单的 is_order_complete 为真(空真)。
//         两者同时成立: 进度条显示 0%,订单仍可完成。
// ==========================================

use crate::domain::order::Order;
use serde::{Deserialize, Serialize};

/// 单个订单的行进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProgress {
    pub picked: usize,
    pub total: usize,
}

impl LineProgress {
    pub fn percent(&self) -> u8 {
        percent(self.picked, self.total)
    }
}

/// 批次(多订单)进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchProgress {
    pub picked: usize,
    pub total: usize,
    pub percent: u8,
}

/// 百分比(四舍五入,半数向上),total = 0 时为 0
pub fn percent(picked: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let picked = picked.min(total) as u64;
    let total = total as u64;
    // round(picked / total * 100) 的整数形式
    ((picked * 200 + total) / (total * 2)) as u8
}

/// 统计订单已拣行数与总行数
pub fn line_progress(order: &Order) -> LineProgress {
    LineProgress {
        picked: order.lines.iter().filter(|l| l.picked).count(),
        total: order.lines.len(),
    }
}

/// 订单完成百分比 0-100
pub fn order_percent(order: &Order) -> u8 {
    line_progress(order).percent()
}

/// 订单所有行是否都已拣(零行为真)
pub fn is_order_complete(order: &Order) -> bool {
    order.lines.iter().all(|l| l.picked)
}

/// 跨订单汇总进度
pub fn batch_progress<'a, I>(orders: I) -> BatchProgress
where
    I: IntoIterator<Item = &'a Order>,
{
    let (picked, total) = orders.into_iter().fold((0, 0), |(p, t), order| {
        let progress = line_progress(order);
        (p + progress.picked, t + progress.total)
    });

    BatchProgress {
        picked,
        total,
        percent: percent(picked, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CustomerRef, OrderLine, ProductInfo};
    use crate::domain::types::{DeliveryPriority, OrderStatus};
    use chrono::NaiveDate;

    fn make_order(order_id: &str, flags: &[bool]) -> Order {
        Order {
            order_id: order_id.to_string(),
            order_number: format!("PED-{}", order_id),
            customer: CustomerRef {
                customer_id: "C1".to_string(),
                name: None,
                address: None,
            },
            route: "R1".to_string(),
            status: OrderStatus::InPicking,
            ordered_at: NaiveDate::from_ymd_opt(2026, 1, 10)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            priority: DeliveryPriority::Routine,
            notes: None,
            lines: flags
                .iter()
                .enumerate()
                .map(|(i, picked)| OrderLine {
                    line_id: format!("{}-L{}", order_id, i),
                    order_id: order_id.to_string(),
                    product: ProductInfo {
                        product_id: format!("P{}", i),
                        name: "Agua".to_string(),
                        format: None,
                        image_url: None,
                    },
                    quantity: 1,
                    picked: *picked,
                })
                .collect(),
        }
    }

    #[test]
    fn test_zero_lines_percent_zero_but_complete() {
        let order = make_order("O0", &[]);
        assert_eq!(order_percent(&order), 0);
        assert!(is_order_complete(&order));
        assert_eq!(line_progress(&order), LineProgress { picked: 0, total: 0 });
    }

    #[test]
    fn test_partial_order() {
        let order = make_order("O1", &[true, false, false]);
        assert_eq!(line_progress(&order), LineProgress { picked: 1, total: 3 });
        assert_eq!(order_percent(&order), 33);
        assert!(!is_order_complete(&order));
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(percent(1, 8), 13); // 12.5
        assert_eq!(percent(2, 3), 67); // 66.67
        assert_eq!(percent(1, 200), 1); // 0.5
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_batch_progress_example() {
        let order1 = make_order("O1", &[true, true, false, false]);
        let order2 = make_order("O2", &[true, true, true]);

        let progress = batch_progress([&order1, &order2]);
        assert_eq!(progress.picked, 5);
        assert_eq!(progress.total, 7);
        assert_eq!(progress.percent, 71);
    }

    #[test]
    fn test_batch_progress_empty() {
        let progress = batch_progress(std::iter::empty::<&Order>());
        assert_eq!(progress, BatchProgress::default());

        let empty = make_order("O0", &[]);
        assert_eq!(batch_progress([&empty]).percent, 0);
    }
}
