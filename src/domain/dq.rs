// ==========================================
// 门店物料分配系统 - 数据质量报告
// ==========================================
// 用途: 加载器对被跳过/被兜底的行留痕
// ==========================================

use crate::domain::types::DqLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,            // 原始文件行号（表头为第 1 行）
    pub product_code: Option<String>, // 产品代码（如果可解析）
    pub level: DqLevel,               // 违规级别
    pub field: String,                // 违规字段
    pub message: String,              // 违规描述
}

// ==========================================
// LoadReport - 加载结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport<T> {
    pub items: Vec<T>,                // 成功加载的记录（保持文件顺序）
    pub total_rows: usize,            // 非空数据行数
    pub violations: Vec<DqViolation>, // 违规明细
}

impl<T> LoadReport<T> {
    /// 被跳过（ERROR 级别）的行数
    pub fn skipped(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .count()
    }
}
