// ==========================================
// 门店物料分配系统 - 字段映射器实现
// ==========================================
// 职责: 源列名（含别名）→ 领域对象
// 参考数据: Cod / Cód. Produto / Perda / Receita Bruta
// 当日物料: CÓDIGO / DESCRIÇÃO / QUANTIDADE
// ==========================================

use crate::domain::dq::DqViolation;
use crate::domain::material::MaterialRequest;
use crate::domain::reference::ReferenceObservation;
use crate::domain::types::DqLevel;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{ParsedSheet, RawRow};

// ==========================================
// 列名别名表
// ==========================================
pub mod columns {
    pub const STORE_CODE: &[&str] = &["Cod", "CodLoja", "Cod. Loja", "store_code"];
    pub const PRODUCT_CODE: &[&str] = &[
        "Cód. Produto",
        "Cod. Produto",
        "Cód Produto",
        "CodProduto",
        "product_code",
    ];
    pub const LOSS: &[&str] = &["Perda", "loss"];
    pub const GROSS_REVENUE: &[&str] = &["Receita Bruta", "ReceitaBruta", "gross_revenue"];

    pub const MATERIAL_CODE: &[&str] = &["CÓDIGO", "CODIGO", "Código", "Material", "product_code"];
    pub const DESCRIPTION: &[&str] = &["DESCRIÇÃO", "DESCRICAO", "Descrição", "Descricao", "description"];
    pub const QUANTITY: &[&str] = &["QUANTIDADE", "Quantidade", "quantity"];
}

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 提取字段（先精确匹配别名，再忽略大小写匹配）
    pub fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        for alias in aliases {
            if let Some(v) = row.get(alias) {
                if let Some(value) = self.cleaner.normalize_null(Some(v.to_string())) {
                    return Some(value);
                }
            }
        }

        for alias in aliases {
            let hit = row.get_ignore_case(alias).map(str::to_string);
            if let Some(value) = self.cleaner.normalize_null(hit) {
                return Some(value);
            }
        }
        None
    }

    /// 校验表头包含必需列（空表同样校验）
    pub fn ensure_columns(
        &self,
        sheet: &ParsedSheet,
        required: &[(&str, &[&str])],
    ) -> ImportResult<()> {
        for (column, aliases) in required {
            if !sheet.has_column(aliases) {
                return Err(ImportError::MissingColumn {
                    column: column.to_string(),
                    aliases: aliases.join(" / "),
                });
            }
        }
        Ok(())
    }

    // ==========================================
    // 参考数据行
    // ==========================================
    /// 缺少代码或数值无法解析的行整行跳过
    pub fn map_reference(&self, row: &RawRow) -> Result<ReferenceObservation, DqViolation> {
        let product_code = self
            .get_string(row, columns::PRODUCT_CODE)
            .map(|v| self.cleaner.normalize_code(&v));

        let violation = |field: &str, message: String| DqViolation {
            row_number: row.row_number,
            product_code: product_code.clone(),
            level: DqLevel::Error,
            field: field.to_string(),
            message,
        };

        let Some(code) = product_code.clone() else {
            return Err(violation("product_code", "产品代码为空".to_string()));
        };

        let store_code = match self.get_string(row, columns::STORE_CODE) {
            Some(v) => self.cleaner.normalize_code(&v),
            None => return Err(violation("store_code", "门店代码为空".to_string())),
        };

        let loss = self.parse_required(row, columns::LOSS).map_err(|raw| {
            violation("loss", format!("损耗无法解析为数值: {:?}", raw))
        })?;

        let gross_revenue = self
            .parse_required(row, columns::GROSS_REVENUE)
            .map_err(|raw| violation("gross_revenue", format!("毛收入无法解析为数值: {:?}", raw)))?;

        Ok(ReferenceObservation::new(store_code, code, loss, gross_revenue))
    }

    // ==========================================
    // 当日物料行
    // ==========================================
    /// 物料行从不跳过：数量无法解析记 0，描述缺失记空串，
    /// 由分配引擎将其判定为非法输入
    pub fn map_material(&self, row: &RawRow) -> (MaterialRequest, Vec<DqViolation>) {
        let mut violations = Vec::new();

        let product_code = self
            .get_string(row, columns::MATERIAL_CODE)
            .map(|v| self.cleaner.normalize_code(&v));
        let warn = |field: &str, message: &str| DqViolation {
            row_number: row.row_number,
            product_code: product_code.clone(),
            level: DqLevel::Warning,
            field: field.to_string(),
            message: message.to_string(),
        };

        if product_code.is_none() {
            violations.push(warn("product_code", "产品代码为空"));
        }

        let description = match self.get_string(row, columns::DESCRIPTION) {
            Some(v) => v,
            None => {
                violations.push(warn("description", "描述为空，按空串处理"));
                String::new()
            }
        };

        let quantity = match self.parse_required(row, columns::QUANTITY) {
            Ok(v) => v,
            Err(_) => {
                violations.push(warn("quantity", "数量无法解析，按 0 处理"));
                0.0
            }
        };

        (
            MaterialRequest::new(product_code.unwrap_or_default(), description, quantity),
            violations,
        )
    }

    /// Err 携带原始值（缺失时为 None）
    fn parse_required(&self, row: &RawRow, aliases: &[&str]) -> Result<f64, Option<String>> {
        let raw = self.get_string(row, aliases);
        raw.as_deref()
            .and_then(|v| self.cleaner.parse_decimal(v))
            .ok_or(raw)
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 2,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn sheet(headers: &[&str], rows: Vec<RawRow>) -> ParsedSheet {
        ParsedSheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_map_reference_with_original_headers() {
        let mapper = FieldMapper::new();
        let obs = mapper
            .map_reference(&row(&[
                ("Cod", "S1"),
                ("Cód. Produto", "1001.0"),
                ("Perda", "0,25"),
                ("Receita Bruta", "1500"),
            ]))
            .unwrap();

        assert_eq!(obs.store_code, "S1");
        assert_eq!(obs.product_code, "1001");
        assert_eq!(obs.loss, 0.25);
        assert_eq!(obs.gross_revenue, 1500.0);
    }

    #[test]
    fn test_map_reference_with_english_aliases() {
        let mapper = FieldMapper::new();
        let obs = mapper
            .map_reference(&row(&[
                ("STORE_CODE", "S9"),
                ("product_code", "A"),
                ("loss", "1"),
                ("gross_revenue", "2"),
            ]))
            .unwrap();
        assert_eq!(obs.store_code, "S9");
    }

    #[test]
    fn test_map_reference_rejects_bad_loss() {
        let mapper = FieldMapper::new();
        let err = mapper
            .map_reference(&row(&[
                ("Cod", "S1"),
                ("Cód. Produto", "A"),
                ("Perda", "n/a"),
                ("Receita Bruta", "10"),
            ]))
            .unwrap_err();

        assert_eq!(err.field, "loss");
        assert_eq!(err.level, DqLevel::Error);
        assert_eq!(err.product_code.as_deref(), Some("A"));
    }

    #[test]
    fn test_map_material_coerces() {
        let mapper = FieldMapper::new();
        let (material, violations) = mapper.map_material(&row(&[
            ("CÓDIGO", "1001"),
            ("QUANTIDADE", "x"),
        ]));

        assert_eq!(material.product_code, "1001");
        assert_eq!(material.description, "");
        assert_eq!(material.quantity, 0.0);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.level == DqLevel::Warning));
    }

    #[test]
    fn test_ensure_columns() {
        let mapper = FieldMapper::new();
        let parsed = sheet(
            &["CÓDIGO", "QUANTIDADE"],
            vec![row(&[("CÓDIGO", "1"), ("QUANTIDADE", "2")])],
        );

        assert!(mapper
            .ensure_columns(&parsed, &[("CÓDIGO", columns::MATERIAL_CODE)])
            .is_ok());
        let err = mapper
            .ensure_columns(&parsed, &[("Perda", columns::LOSS)])
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { .. }));
    }

    #[test]
    fn test_ensure_columns_uses_header_not_first_row() {
        let mapper = FieldMapper::new();
        // 首行缺少 Receita Bruta 的值，表头中存在
        let parsed = sheet(
            &["Cod", "Cód. Produto", "Perda", "Receita Bruta"],
            vec![row(&[("Cod", "S1"), ("Cód. Produto", "A"), ("Perda", "0.5")])],
        );
        assert!(mapper
            .ensure_columns(&parsed, &[("Receita Bruta", columns::GROSS_REVENUE)])
            .is_ok());
    }

    #[test]
    fn test_ensure_columns_checks_header_only_sheet() {
        let mapper = FieldMapper::new();
        let parsed = sheet(&["Loja", "Valor"], Vec::new());
        let err = mapper
            .ensure_columns(&parsed, &[("Perda", columns::LOSS)])
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { column, .. } if column == "Perda"));
    }

    #[test]
    fn test_case_insensitive_lookup_follows_column_order() {
        let mapper = FieldMapper::new();
        let r = row(&[("PERDA", "0.1"), ("perda", "0.9")]);
        for _ in 0..10 {
            assert_eq!(mapper.get_string(&r, columns::LOSS), Some("0.1".to_string()));
        }
    }
}
