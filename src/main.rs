// ==========================================
// 仓库拣货核心 - 主入口
// ==========================================
// 打开数据库、建表、输出各状态订单数
// ==========================================

use warehouse_picking::app::{get_default_db_path, AppState};
use warehouse_picking::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 系统版本: {}", warehouse_picking::APP_NAME, warehouse_picking::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).await.map_err(anyhow::Error::msg)?;

    let counts = app_state.warehouse_api.status_counts().await?;
    tracing::info!(
        pending = counts.pending,
        in_picking = counts.in_picking,
        prepared = counts.prepared,
        "订单状态统计"
    );

    Ok(())
}
