// ==========================================
// 门店物料分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod distribution;
pub mod dq;
pub mod material;
pub mod reference;
pub mod types;

// 重导出核心类型
pub use distribution::{AllocationDecision, DistributionRecord};
pub use dq::{DqViolation, LoadReport};
pub use material::{MaterialRequest, StoredMaterial};
pub use reference::ReferenceObservation;
pub use types::{DqLevel, ExportFormat, RunPhase, SelectionReason};
