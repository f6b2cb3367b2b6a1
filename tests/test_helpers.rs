// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据写入等功能
// ==========================================

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use warehouse_picking::db::{init_schema, open_sqlite_connection};
use warehouse_picking::domain::order::Order;
use warehouse_picking::repository::OrderRepository;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（已应用统一 PRAGMA）
pub fn open_shared_conn(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 批量写入测试订单
pub fn seed_orders(repo: &OrderRepository, orders: &[Order]) -> Result<(), Box<dyn Error>> {
    for order in orders {
        repo.insert_order(order)?;
    }
    Ok(())
}
