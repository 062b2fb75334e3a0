// ==========================================
// 门店物料分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按历史损耗/毛收入将当日物料分配到门店
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 分配表
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DqLevel, ExportFormat, RunPhase, SelectionReason};

// 领域实体
pub use domain::{
    AllocationDecision, DistributionRecord, DqViolation, LoadReport, MaterialRequest,
    ReferenceObservation,
};

// 引擎
pub use engine::{
    AllocationEngine, AllocationOutcome, CapacityTracker, DistributionRun, EngineError,
    ReferenceIndex, StoreRanker,
};

// 导出
pub use exporter::{CsvExporter, DistributionExporter, XlsxExporter};

// 配置
pub use config::AllocationConfig;

// API
pub use api::{DistributionApi, DistributionRequest, DistributionRunReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "门店物料分配系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
