// ==========================================
// 门店物料分配系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod distribution_api;
pub mod error;

// 重导出核心类型
pub use distribution_api::{
    run_with, BatchImportReport, BatchSource, ConfigOverrides, DistributionApi,
    DistributionRequest, DistributionRunReport, ExportArtifact, LoadSummary, EXPORT_FILE_STEM,
};
pub use error::{ApiError, ApiResult};
