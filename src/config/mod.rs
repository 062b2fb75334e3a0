// ==========================================
// 门店物料分配系统 - 配置层
// ==========================================
// 职责: 系统配置管理,支持多级覆写
// 存储: config_kv 表
// ==========================================

pub mod allocation_config;
pub mod config_manager;
pub mod error;

// 重导出核心配置类型
pub use allocation_config::{
    AllocationConfig, DEFAULT_FALLBACK_STORE_CODE, DEFAULT_SHEET_NAME, DEFAULT_STORE_CAP,
};
pub use config_manager::{config_keys, AllocationConfigReader, ConfigManager};
pub use error::{ConfigError, ConfigResult};
