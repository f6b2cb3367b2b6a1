// ==========================================
// 仓库拣货核心 - 核心库
// ==========================================
// 流程: Pending → InPicking → Prepared → InDelivery → Delivered
// 技术栈: Rust + SQLite
// 定位: 选择/拣货/完成检测,写后确认
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 进度聚合与状态机
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 实例组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DeliveryPriority, OrderStatus};

// 领域实体
pub use domain::{ActionLog, ActionType, Order, OrderLine, PickingHandoff, SelectionSet};

// 引擎
pub use engine::{BatchProgress, LineProgress, PickingStateMachine};

// 仓储
pub use repository::{OrderRepository, OrderStore};

// API
pub use api::{PickingApi, SelectionApi, WarehouseApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库拣货核心";
