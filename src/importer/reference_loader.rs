// ==========================================
// 门店物料分配系统 - 参考数据加载器
// ==========================================

use crate::domain::dq::LoadReport;
use crate::domain::reference::ReferenceObservation;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{columns, FieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::loader_trait::ReferenceLoader;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

pub struct FileReferenceLoader {
    path: PathBuf,
    mapper: FieldMapper,
}

impl FileReferenceLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mapper: FieldMapper::new(),
        }
    }
}

#[async_trait]
impl ReferenceLoader for FileReferenceLoader {
    #[instrument(skip(self))]
    async fn load_reference(&self) -> ImportResult<LoadReport<ReferenceObservation>> {
        let sheet = UniversalFileParser.parse(&self.path)?;
        self.mapper.ensure_columns(
            &sheet,
            &[
                ("Cod", columns::STORE_CODE),
                ("Cód. Produto", columns::PRODUCT_CODE),
                ("Perda", columns::LOSS),
                ("Receita Bruta", columns::GROSS_REVENUE),
            ],
        )?;

        let rows = sheet.rows;
        let total_rows = rows.len();
        let mut items = Vec::with_capacity(total_rows);
        let mut violations = Vec::new();

        for row in &rows {
            match self.mapper.map_reference(row) {
                Ok(obs) => items.push(obs),
                Err(violation) => {
                    warn!(
                        row_number = violation.row_number,
                        field = %violation.field,
                        message = %violation.message,
                        "参考数据行已跳过"
                    );
                    violations.push(violation);
                }
            }
        }

        info!(
            path = %self.path.display(),
            total_rows,
            loaded = items.len(),
            skipped = violations.len(),
            "参考数据加载完成"
        );

        Ok(LoadReport {
            items,
            total_rows,
            violations,
        })
    }
}
