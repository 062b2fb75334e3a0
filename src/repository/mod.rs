// ==========================================
// 门店物料分配系统 - 仓储层
// ==========================================
// 职责: 数据访问,不含业务逻辑
// 红线: Repository 不含引擎逻辑
// ==========================================

pub mod distribution_repo;
pub mod error;
pub mod material_batch_repo;

pub use distribution_repo::{
    DistributionRepository, DistributionRunSummary, DistributionSink, StoredFailure,
};
pub use error::{RepositoryError, RepositoryResult};
pub use material_batch_repo::{DailyBatchLoader, MaterialBatchRepository};
