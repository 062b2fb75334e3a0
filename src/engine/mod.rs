// ==========================================
// 门店物料分配系统 - 引擎层
// ==========================================
// 职责: 索引 / 排名 / 容量计数 / 分配 / 阶段编排
// 红线: 引擎不做 I/O，不拼 SQL；每条分配结果必须输出 reason
// ==========================================

pub mod allocation;
pub mod capacity_tracker;
pub mod error;
pub mod orchestrator;
pub mod reference_index;
pub mod store_ranker;

// 重导出核心引擎
pub use allocation::{AllocationEngine, AllocationFailure, AllocationOutcome};
pub use capacity_tracker::CapacityTracker;
pub use error::{EngineError, EngineResult};
pub use orchestrator::DistributionRun;
pub use reference_index::ReferenceIndex;
pub use store_ranker::StoreRanker;
