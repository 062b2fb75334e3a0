// ==========================================
// 门店物料分配系统 - 分配结果领域模型
// ==========================================
// 红线: 每条物料对应一条分配记录或一条显式错误，不允许静默丢失
// ==========================================

use crate::domain::types::SelectionReason;
use serde::{Deserialize, Serialize};

// ==========================================
// DistributionRecord - 分配记录
// ==========================================
// 输出专用，创建后不可修改；顺序 = 输入批次顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRecord {
    pub store_code: String,   // 目标门店
    pub product_code: String, // 物料代码
    pub description: String,  // 描述
    pub total_quantity: f64,  // 总数量
}

// ==========================================
// AllocationDecision - 分配决策留痕
// ==========================================
// 与 DistributionRecord 一一对应，用于审计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub position: usize,        // 输入批次中的位置（从 0 开始）
    pub product_code: String,   // 物料代码
    pub store_code: String,     // 最终门店
    pub reason: SelectionReason,
    pub candidate_count: usize, // 参考数据中的候选门店数
}
