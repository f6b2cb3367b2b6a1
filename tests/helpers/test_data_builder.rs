// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use warehouse_picking::domain::order::{CustomerRef, Order, OrderLine, ProductInfo};
use warehouse_picking::domain::types::{DeliveryPriority, OrderStatus};

// ==========================================
// Order 构建器
// ==========================================

pub struct OrderBuilder {
    order_id: String,
    order_number: Option<String>,
    customer_id: String,
    customer_name: Option<String>,
    route: String,
    status: OrderStatus,
    ordered_at: NaiveDateTime,
    priority: DeliveryPriority,
    notes: Option<String>,
    lines: Vec<(u32, bool)>,
}

impl OrderBuilder {
    pub fn new(order_id: &str) -> Self {
        Self {
            order_id: order_id.to_string(),
            order_number: None,
            customer_id: "C001".to_string(),
            customer_name: Some("Bar Central".to_string()),
            route: "R01".to_string(),
            status: OrderStatus::Pending,
            ordered_at: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            priority: DeliveryPriority::Routine,
            notes: None,
            lines: Vec::new(),
        }
    }

    pub fn order_number(mut self, number: &str) -> Self {
        self.order_number = Some(number.to_string());
        self
    }

    pub fn customer(mut self, customer_id: &str, name: &str) -> Self {
        self.customer_id = customer_id.to_string();
        self.customer_name = Some(name.to_string());
        self
    }

    pub fn route(mut self, route: &str) -> Self {
        self.route = route.to_string();
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn ordered_on(mut self, date: NaiveDate) -> Self {
        self.ordered_at = date.and_hms_opt(9, 30, 0).unwrap();
        self
    }

    pub fn urgent(mut self) -> Self {
        self.priority = DeliveryPriority::Urgent;
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// 追加一行
    pub fn line(mut self, quantity: u32, picked: bool) -> Self {
        self.lines.push((quantity, picked));
        self
    }

    /// 追加多行（数量均为 1）
    pub fn lines(mut self, flags: &[bool]) -> Self {
        self.lines.extend(flags.iter().map(|f| (1, *f)));
        self
    }

    pub fn build(self) -> Order {
        let order_id = self.order_id;
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, (quantity, picked))| OrderLine {
                line_id: line_id(&order_id, i),
                order_id: order_id.clone(),
                product: ProductInfo {
                    product_id: format!("P{:03}", i),
                    name: format!("Producto {}", i),
                    format: Some("Caja 6u".to_string()),
                    image_url: None,
                },
                quantity: *quantity,
                picked: *picked,
            })
            .collect();

        Order {
            order_number: self
                .order_number
                .unwrap_or_else(|| format!("PED-{}", order_id)),
            order_id,
            customer: CustomerRef {
                customer_id: self.customer_id,
                name: self.customer_name,
                address: Some("Calle Mayor 1".to_string()),
            },
            route: self.route,
            status: self.status,
            ordered_at: self.ordered_at,
            priority: self.priority,
            notes: self.notes,
            lines,
        }
    }
}

/// 构建器生成的行ID
pub fn line_id(order_id: &str, index: usize) -> String {
    format!("{}-L{}", order_id, index)
}
