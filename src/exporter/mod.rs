// ==========================================
// 门店物料分配系统 - 导出层
// ==========================================
// 职责: 分配结果 → 表格字节流（xlsx / csv）
// 红线: 列布局保持稳定（下游消费方依赖），不过滤、不重排
// ==========================================

pub mod csv_exporter;
pub mod error;
pub mod xlsx_exporter;

use crate::config::AllocationConfig;
use crate::domain::distribution::DistributionRecord;
use crate::domain::types::ExportFormat;
use std::path::Path;

pub use csv_exporter::CsvExporter;
pub use error::{ExportError, ExportResult};
pub use xlsx_exporter::XlsxExporter;

/// 导出列（门店代码, 物料代码, 描述, 总数量）
pub const EXPORT_HEADERS: [&str; 4] = ["CodLoja", "Material", "Descricao", "QuantidadeTotal"];

// ==========================================
// DistributionExporter Trait
// ==========================================
// 实现者: XlsxExporter, CsvExporter
pub trait DistributionExporter: Send + Sync {
    /// 导出格式
    fn format(&self) -> ExportFormat;

    /// 序列化分配记录：一行表头 + 每条记录一行，顺序与输入一致
    fn export(&self, records: &[DistributionRecord]) -> ExportResult<Vec<u8>>;
}

/// 根据配置选择导出器
pub fn exporter_for(config: &AllocationConfig) -> Box<dyn DistributionExporter> {
    match config.export_format {
        ExportFormat::Xlsx => Box::new(XlsxExporter::new(config.sheet_name.clone())),
        ExportFormat::Csv => Box::new(CsvExporter),
    }
}

/// 将导出结果写到磁盘（导出消费方）
pub fn write_blob<P: AsRef<Path>>(path: P, blob: &[u8]) -> ExportResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, blob)?;
    tracing::info!(path = %path.display(), bytes = blob.len(), "分配表已写出");
    Ok(())
}
