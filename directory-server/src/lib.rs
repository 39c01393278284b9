//! Directory Server - 多租户员工目录服务
//!
//! # 架构概述
//!
//! 本模块是目录服务的主入口，提供以下核心功能：
//!
//! - **校验层** (`utils::validation`): 规范化并拒绝非法的员工负载
//! - **数据库** (`db`): SQLite 存储，按租户隔离的仓储层
//! - **层级关系** (`db::repository::employee`): 汇报链遍历与环检测
//! - **自定义字段** (`fields`): 租户自定义字段的类型校验
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! directory-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器（含租户上下文提取）
//! ├── db/            # 数据库层与仓储
//! ├── fields.rs      # 自定义字段值校验
//! └── utils/         # 错误、日志、输入校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod fields;
pub mod utils;

// Re-export 公共类型
pub use self::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
