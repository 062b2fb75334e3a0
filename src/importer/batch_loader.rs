// ==========================================
// 门店物料分配系统 - 当日物料加载器（文件）
// ==========================================

use crate::domain::dq::LoadReport;
use crate::domain::material::MaterialRequest;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{columns, FieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::loader_trait::BatchLoader;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

pub struct FileBatchLoader {
    path: PathBuf,
    mapper: FieldMapper,
}

impl FileBatchLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mapper: FieldMapper::new(),
        }
    }
}

#[async_trait]
impl BatchLoader for FileBatchLoader {
    #[instrument(skip(self))]
    async fn load_batch(&self) -> ImportResult<LoadReport<MaterialRequest>> {
        let sheet = UniversalFileParser.parse(&self.path)?;
        self.mapper
            .ensure_columns(&sheet, &[("CÓDIGO", columns::MATERIAL_CODE)])?;

        let rows = sheet.rows;
        let total_rows = rows.len();
        let mut items = Vec::with_capacity(total_rows);
        let mut violations = Vec::new();

        for row in &rows {
            let (material, row_violations) = self.mapper.map_material(row);
            for v in &row_violations {
                debug!(row_number = v.row_number, field = %v.field, "{}", v.message);
            }
            items.push(material);
            violations.extend(row_violations);
        }

        info!(
            path = %self.path.display(),
            total_rows,
            warnings = violations.len(),
            "当日物料加载完成"
        );

        Ok(LoadReport {
            items,
            total_rows,
            violations,
        })
    }
}
