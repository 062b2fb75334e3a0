// ==========================================
// 门店物料分配系统 - Excel 导出器
// ==========================================
// 输出: 单工作表 xlsx（默认工作表名 Distribuicao）
// ==========================================

use crate::config::DEFAULT_SHEET_NAME;
use crate::domain::distribution::DistributionRecord;
use crate::domain::types::ExportFormat;
use crate::exporter::error::ExportResult;
use crate::exporter::{DistributionExporter, EXPORT_HEADERS};
use rust_xlsxwriter::{Format, Workbook};

pub struct XlsxExporter {
    sheet_name: String,
}

impl XlsxExporter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl DistributionExporter for XlsxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn export(&self, records: &[DistributionRecord]) -> ExportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.sheet_name.as_str())?;

        for (col, header) in EXPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (idx, record) in records.iter().enumerate() {
            let row = (idx + 1) as u32;
            worksheet.write_string(row, 0, record.store_code.as_str())?;
            worksheet.write_string(row, 1, record.product_code.as_str())?;
            worksheet.write_string(row, 2, record.description.as_str())?;
            worksheet.write_number(row, 3, record.total_quantity)?;
        }

        Ok(workbook.save_to_buffer()?)
    }
}
