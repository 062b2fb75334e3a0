// ==========================================
// 门店物料分配系统 - 输入加载 Trait
// ==========================================
// 职责: 定义参考数据 / 当日物料的加载接口（不包含实现）
// ==========================================

use crate::domain::dq::LoadReport;
use crate::domain::material::MaterialRequest;
use crate::domain::reference::ReferenceObservation;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// ReferenceLoader Trait
// ==========================================
// 实现者: FileReferenceLoader
#[async_trait]
pub trait ReferenceLoader: Send + Sync {
    /// 加载参考数据（门店 × 产品 的损耗与毛收入）
    ///
    /// # 返回
    /// - Ok(LoadReport): 有效观测 + 被跳过行的 DQ 明细
    /// - Err: 文件不存在、格式不支持、缺少必需列
    async fn load_reference(&self) -> ImportResult<LoadReport<ReferenceObservation>>;
}

// ==========================================
// BatchLoader Trait
// ==========================================
// 实现者: FileBatchLoader, DailyBatchLoader
#[async_trait]
pub trait BatchLoader: Send + Sync {
    /// 加载待分配物料，顺序即分配顺序
    ///
    /// # 返回
    /// - Ok(LoadReport): 每个非空数据行对应一条物料；被兜底的字段记为 Warning
    /// - Err: 数据源不可读
    async fn load_batch(&self) -> ImportResult<LoadReport<MaterialRequest>>;
}
