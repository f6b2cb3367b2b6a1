use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = ActionLog::new(ActionType::PickLine, "picker-1")
        .with_order("O1")
        .with_line("O1-L0")
        .with_payload(&serde_json::json!({"picked": true}));
    let action_id = repo.insert(&log).unwrap();

    let loaded = repo.find_by_id(&action_id).unwrap().unwrap();
    assert_eq!(loaded.action_type, "PickLine");
    assert_eq!(loaded.actor, "picker-1");
    assert_eq!(loaded.line_id.as_deref(), Some("O1-L0"));
    assert_eq!(loaded.payload_json.unwrap()["picked"], true);

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_find_by_order_keeps_insert_order() {
    let repo = ActionLogRepository::new(setup_test_db());

    let logs = vec![
        ActionLog::new(ActionType::StartPicking, "w").with_order("O1"),
        ActionLog::new(ActionType::PickLine, "w").with_order("O1").with_line("L1"),
        ActionLog::new(ActionType::CompleteOrder, "w").with_order("O1"),
        ActionLog::new(ActionType::StartPicking, "w").with_order("O2"),
    ];
    assert_eq!(repo.batch_insert(logs).unwrap(), 4);

    let types: Vec<String> = repo
        .find_by_order_id("O1")
        .unwrap()
        .into_iter()
        .map(|l| l.action_type)
        .collect();
    assert_eq!(types, vec!["StartPicking", "PickLine", "CompleteOrder"]);
    assert_eq!(repo.find_by_order_id("O2").unwrap().len(), 1);
    assert_eq!(repo.find_by_action_type("StartPicking", 10).unwrap().len(), 2);
    assert_eq!(repo.find_recent(2).unwrap().len(), 2);
}
