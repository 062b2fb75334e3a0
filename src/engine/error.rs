// ==========================================
// 门店物料分配系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 缺少参考数据不是错误（走兜底门店），因此这里没有对应变体
// ==========================================

use crate::domain::types::RunPhase;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 未先调用 can_accept 就记录分配（编排错误，正常流程不会出现）
    #[error("门店已达分配上限: store_code={store_code}, cap={cap}")]
    CapacityExceeded { store_code: String, cap: u32 },

    /// 单条物料不合法（只拒绝该条，不中断整个批次）
    #[error("物料数据不合法 (位置 {position}, 产品代码 '{product_code}'): {reason}")]
    MalformedInput {
        position: usize,
        product_code: String,
        reason: String,
    },

    /// 运行阶段顺序错误（单次运行内阶段不可重入）
    #[error("运行阶段错误: 当前阶段 {current}，该操作要求 {expected}")]
    PhaseViolation { current: RunPhase, expected: RunPhase },

    #[error("导出失败: {0}")]
    ExportFailed(String),
}

impl From<crate::exporter::ExportError> for EngineError {
    fn from(err: crate::exporter::ExportError) -> Self {
        EngineError::ExportFailed(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
