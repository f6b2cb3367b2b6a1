// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 验证订单仓储在文件数据库上的读写与 OrderStore 契约
// ==========================================

mod helpers;
mod test_helpers;

use std::sync::Arc;

use helpers::test_data_builder::{line_id, OrderBuilder};
use warehouse_picking::domain::action_log::{ActionLog, ActionType};
use warehouse_picking::domain::types::OrderStatus;
use warehouse_picking::repository::{
    ActionLogRepository, OrderRepository, OrderStore, RepositoryError,
};

fn setup() -> (tempfile::NamedTempFile, OrderRepository) {
    let (temp_file, db_path) = test_helpers::create_test_db().expect("无法创建测试数据库");
    let repo = OrderRepository::new(&db_path).expect("无法创建仓储");
    (temp_file, repo)
}

#[tokio::test]
async fn test_store_contract_roundtrip() {
    let (_temp, repo) = setup();
    let order = OrderBuilder::new("O1").notes("Puerta trasera").line(3, false).line(1, true).build();
    repo.insert_order(&order).unwrap();

    let store: Arc<dyn OrderStore> = Arc::new(repo);
    let pending = store.query_orders_by_status(OrderStatus::Pending).await.unwrap();
    assert_eq!(pending, vec![order.clone()]);

    store.update_line_pick_flag(&line_id("O1", 0), true).await.unwrap();
    store
        .bulk_update_order_status(&["O1".to_string()], OrderStatus::InPicking)
        .await
        .unwrap();

    let loaded = store
        .query_orders_by_ids(&["O1".to_string()], Some(OrderStatus::InPicking))
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].lines.iter().all(|l| l.picked));
    assert_eq!(loaded[0].notes.as_deref(), Some("Puerta trasera"));
}

#[tokio::test]
async fn test_update_missing_rows_report_not_found() {
    let (_temp, repo) = setup();

    let err = repo.update_line_pick_flag("missing", true).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));

    let err = repo
        .update_order_status("missing", OrderStatus::Prepared)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[test]
fn test_duplicate_order_number_is_rejected() {
    let (_temp, repo) = setup();
    repo.insert_order(&OrderBuilder::new("O1").order_number("PED-1").build()).unwrap();

    let err = repo
        .insert_order(&OrderBuilder::new("O2").order_number("PED-1").build())
        .unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
}

#[test]
fn test_action_log_shares_database() {
    let (_temp, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared_conn(&db_path).unwrap();
    let repo = ActionLogRepository::new(conn);

    let logs = vec![
        ActionLog::new(ActionType::StartPicking, "tester").with_order("O1"),
        ActionLog::new(ActionType::PickLine, "tester")
            .with_order("O1")
            .with_line("O1-L0"),
    ];
    assert_eq!(repo.batch_insert(logs).unwrap(), 2);
    assert_eq!(repo.find_by_order_id("O1").unwrap().len(), 2);
    assert_eq!(repo.find_recent(10).unwrap().len(), 2);
}
