use super::OrderStore;
use crate::db::open_sqlite_connection;
use crate::domain::order::{CustomerRef, Order, OrderLine, ProductInfo};
use crate::domain::types::{DeliveryPriority, OrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// OrderRepository - 订单仓储
// ==========================================
/// 订单仓储
/// 职责: 管理 orders / order_lines 表的读取与单字段写入
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

/// orders 行的原始映射（枚举字段在闭包外解析,便于报告字段错误）
struct RawOrderRow {
    order_id: String,
    order_number: String,
    customer_id: String,
    customer_name: Option<String>,
    customer_address: Option<String>,
    route: String,
    status: String,
    ordered_at: NaiveDateTime,
    priority: String,
    notes: Option<String>,
}

struct RawLineRow {
    line_id: String,
    order_id: String,
    product_id: String,
    product_name: String,
    product_format: Option<String>,
    product_image_url: Option<String>,
    quantity: i64,
    picked: bool,
}

const ORDER_SELECT: &str = r#"
    SELECT o.order_id, o.order_number, o.customer_id, c.name, c.address,
           o.route, o.status, o.ordered_at, o.priority, o.notes
    FROM orders o
    LEFT JOIN customers c ON c.customer_id = o.customer_id
"#;

impl OrderRepository {
    /// 创建新的 OrderRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按状态查询订单（按下单时间升序）
    pub fn find_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE o.status = ?1 ORDER BY o.ordered_at ASC, o.order_number ASC", ORDER_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![status.to_db_str()], Self::map_order_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        Self::assemble(&conn, rows)
    }

    /// 按 ID 集合查询订单（按路线升序,同路线按下单时间）
    pub fn find_by_ids(
        &self,
        order_ids: &[String],
        status_filter: Option<OrderStatus>,
    ) -> RepositoryResult<Vec<Order>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_conn()?;
        let placeholders = vec!["?"; order_ids.len()].join(", ");
        let mut args: Vec<String> = order_ids.to_vec();
        let mut sql = format!("{} WHERE o.order_id IN ({})", ORDER_SELECT, placeholders);
        if let Some(status) = status_filter {
            sql.push_str(" AND o.status = ?");
            args.push(status.to_db_str().to_string());
        }
        sql.push_str(" ORDER BY o.route ASC, o.ordered_at ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), Self::map_order_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        Self::assemble(&conn, rows)
    }

    /// 按 ID 查询单个订单
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        Ok(self.find_by_ids(&[order_id.to_string()], None)?.into_iter().next())
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 更新订单状态
    pub fn set_order_status(&self, order_id: &str, new_status: OrderStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE orders SET status = ?1 WHERE order_id = ?2",
            params![new_status.to_db_str(), order_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    /// 更新订单行拣货标记
    pub fn set_line_picked(&self, line_id: &str, picked: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE order_lines SET picked = ?1 WHERE line_id = ?2",
            params![picked, line_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "OrderLine".to_string(),
                id: line_id.to_string(),
            });
        }
        Ok(())
    }

    /// 批量更新订单状态
    ///
    /// 使用事务: 任一 ID 不存在则整体回滚
    pub fn batch_set_order_status(
        &self,
        order_ids: &[String],
        new_status: OrderStatus,
    ) -> RepositoryResult<usize> {
        if order_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare("UPDATE orders SET status = ?1 WHERE order_id = ?2")?;
            for order_id in order_ids {
                let affected = stmt.execute(params![new_status.to_db_str(), order_id])?;
                if affected == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Order".to_string(),
                        id: order_id.clone(),
                    });
                }
                count += affected;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    /// 写入订单（含客户、产品、订单行）
    ///
    /// 订单录入不属于拣货核心,此方法供初始化数据与测试使用
    pub fn insert_order(&self, order: &Order) -> RepositoryResult<()> {
        for line in &order.lines {
            if line.quantity == 0 {
                return Err(RepositoryError::FieldValueError {
                    field: "quantity".to_string(),
                    message: format!("订单行{}数量必须大于0", line.line_id),
                });
            }
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO customers (customer_id, name, address) VALUES (?1, ?2, ?3)",
            params![order.customer.customer_id, order.customer.name, order.customer.address],
        )?;

        tx.execute(
            r#"
            INSERT INTO orders (
                order_id, order_number, customer_id, route, status,
                ordered_at, priority, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                order.order_id,
                order.order_number,
                order.customer.customer_id,
                order.route,
                order.status.to_db_str(),
                order.ordered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                order.priority.to_db_str(),
                order.notes,
            ],
        )?;

        for (position, line) in order.lines.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO products (product_id, name, format, image_url) VALUES (?1, ?2, ?3, ?4)",
                params![
                    line.product.product_id,
                    line.product.name,
                    line.product.format,
                    line.product.image_url,
                ],
            )?;
            tx.execute(
                r#"
                INSERT INTO order_lines (line_id, order_id, product_id, position, quantity, picked)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    line.line_id,
                    order.order_id,
                    line.product.product_id,
                    position as i64,
                    i64::from(line.quantity),
                    line.picked,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    // ==========================================
    // 行映射辅助
    // ==========================================

    fn map_order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawOrderRow> {
        Ok(RawOrderRow {
            order_id: row.get(0)?,
            order_number: row.get(1)?,
            customer_id: row.get(2)?,
            customer_name: row.get(3)?,
            customer_address: row.get(4)?,
            route: row.get(5)?,
            status: row.get(6)?,
            ordered_at: row.get(7)?,
            priority: row.get(8)?,
            notes: row.get(9)?,
        })
    }

    /// 查询订单行并组装完整订单（保持订单行的 position 顺序）
    fn assemble(conn: &Connection, rows: Vec<RawOrderRow>) -> RepositoryResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<&str> = rows.iter().map(|r| r.order_id.as_str()).collect();
        let mut lines_by_order = Self::load_lines(conn, &order_ids)?;

        rows.into_iter()
            .map(|raw| {
                let status = OrderStatus::from_db_str(&raw.status).ok_or_else(|| {
                    RepositoryError::FieldValueError {
                        field: "status".to_string(),
                        message: format!("订单{}状态值未知: {}", raw.order_id, raw.status),
                    }
                })?;
                let priority = DeliveryPriority::from_db_str(&raw.priority).ok_or_else(|| {
                    RepositoryError::FieldValueError {
                        field: "priority".to_string(),
                        message: format!("订单{}优先级未知: {}", raw.order_id, raw.priority),
                    }
                })?;
                let lines = lines_by_order.remove(&raw.order_id).unwrap_or_default();

                Ok(Order {
                    order_id: raw.order_id,
                    order_number: raw.order_number,
                    customer: CustomerRef {
                        customer_id: raw.customer_id,
                        name: raw.customer_name,
                        address: raw.customer_address,
                    },
                    route: raw.route,
                    status,
                    ordered_at: raw.ordered_at,
                    priority,
                    notes: raw.notes,
                    lines,
                })
            })
            .collect()
    }

    fn load_lines(
        conn: &Connection,
        order_ids: &[&str],
    ) -> RepositoryResult<HashMap<String, Vec<OrderLine>>> {
        let placeholders = vec!["?"; order_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT l.line_id, l.order_id, l.product_id, p.name, p.format, p.image_url,
                   l.quantity, l.picked
            FROM order_lines l
            JOIN products p ON p.product_id = l.product_id
            WHERE l.order_id IN ({})
            ORDER BY l.order_id, l.position ASC
            "#,
            placeholders
        );

        let mut stmt = conn.prepare(&sql)?;
        let raw_lines = stmt
            .query_map(params_from_iter(order_ids.iter()), |row| {
                Ok(RawLineRow {
                    line_id: row.get(0)?,
                    order_id: row.get(1)?,
                    product_id: row.get(2)?,
                    product_name: row.get(3)?,
                    product_format: row.get(4)?,
                    product_image_url: row.get(5)?,
                    quantity: row.get(6)?,
                    picked: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut grouped: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for raw in raw_lines {
            let quantity = u32::try_from(raw.quantity)
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| RepositoryError::FieldValueError {
                    field: "quantity".to_string(),
                    message: format!("订单行{}数量非法: {}", raw.line_id, raw.quantity),
                })?;

            grouped.entry(raw.order_id.clone()).or_default().push(OrderLine {
                line_id: raw.line_id,
                order_id: raw.order_id,
                product: ProductInfo {
                    product_id: raw.product_id,
                    name: raw.product_name,
                    format: raw.product_format,
                    image_url: raw.product_image_url,
                },
                quantity,
                picked: raw.picked,
            });
        }

        Ok(grouped)
    }
}

// ==========================================
// OrderStore Trait 实现
// ==========================================
#[async_trait]
impl OrderStore for OrderRepository {
    async fn query_orders_by_status(&self, status: OrderStatus) -> RepositoryResult<Vec<Order>> {
        self.find_by_status(status)
    }

    async fn query_orders_by_ids(
        &self,
        order_ids: &[String],
        status_filter: Option<OrderStatus>,
    ) -> RepositoryResult<Vec<Order>> {
        self.find_by_ids(order_ids, status_filter)
    }

    async fn update_order_status(&self, order_id: &str, new_status: OrderStatus) -> RepositoryResult<()> {
        self.set_order_status(order_id, new_status)
    }

    async fn update_line_pick_flag(&self, line_id: &str, picked: bool) -> RepositoryResult<()> {
        self.set_line_picked(line_id, picked)
    }

    async fn bulk_update_order_status(
        &self,
        order_ids: &[String],
        new_status: OrderStatus,
    ) -> RepositoryResult<usize> {
        self.batch_set_order_status(order_ids, new_status)
    }
}
