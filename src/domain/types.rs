// ==========================================
// 门店物料分配系统 - 领域类型定义
// ==========================================
// 职责: 分配原因、运行阶段、导出格式等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 选店原因 (Selection Reason)
// ==========================================
// 红线: 每条分配结果必须可解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionReason {
    /// 排名候选中第一个未满额的门店（rank 从 0 开始）
    Ranked { rank: usize },
    /// 参考数据中无该产品的候选门店
    FallbackNoCandidates,
    /// 所有候选门店均已达到上限
    FallbackSaturated,
}

impl SelectionReason {
    /// 是否落入兜底门店
    pub fn is_fallback(&self) -> bool {
        !matches!(self, SelectionReason::Ranked { .. })
    }
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionReason::Ranked { rank } => write!(f, "RANKED#{}", rank),
            SelectionReason::FallbackNoCandidates => write!(f, "FALLBACK_NO_CANDIDATES"),
            SelectionReason::FallbackSaturated => write!(f, "FALLBACK_SATURATED"),
        }
    }
}

// ==========================================
// 运行阶段 (Run Phase)
// ==========================================
// 顺序: INDEXING → ALLOCATING → EXPORTING → COMPLETED，单次运行内不可回退
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    Indexing,
    Allocating,
    Exporting,
    Completed,
}

impl RunPhase {
    /// 下一阶段（COMPLETED 为终态）
    pub fn next(self) -> Option<RunPhase> {
        match self {
            RunPhase::Indexing => Some(RunPhase::Allocating),
            RunPhase::Allocating => Some(RunPhase::Exporting),
            RunPhase::Exporting => Some(RunPhase::Completed),
            RunPhase::Completed => None,
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Indexing => write!(f, "INDEXING"),
            RunPhase::Allocating => write!(f, "ALLOCATING"),
            RunPhase::Exporting => write!(f, "EXPORTING"),
            RunPhase::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 导出格式 (Export Format)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// MIME 类型（供下载方使用）
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("不支持的导出格式: {}（仅支持 xlsx/csv）", other)),
        }
    }
}

// ==========================================
// 数据质量级别 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqLevel {
    Error,   // 错误（该行被跳过）
    Warning, // 警告（已做类型兜底）
}
