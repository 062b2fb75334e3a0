// ==========================================
// 门店物料分配系统 - 分配配置
// ==========================================
// 优先级: 默认值 → config_kv 表 → 命令行参数
// ==========================================

use crate::config::error::ConfigError;
use crate::config::config_manager::config_keys;
use crate::domain::types::ExportFormat;
use serde::{Deserialize, Serialize};

/// 单店单次运行的默认分配上限
pub const DEFAULT_STORE_CAP: u32 = 3;

/// 兜底门店代码（不受上限约束）
pub const DEFAULT_FALLBACK_STORE_CODE: &str = "LOJA_PADRAO";

/// 导出工作表名称
pub const DEFAULT_SHEET_NAME: &str = "Distribuicao";

// ==========================================
// AllocationConfig - 分配配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub store_cap: u32,              // 单店上限
    pub fallback_store_code: String, // 兜底门店
    pub export_format: ExportFormat, // 导出格式
    pub sheet_name: String,          // 导出工作表名（仅 xlsx）
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            store_cap: DEFAULT_STORE_CAP,
            fallback_store_code: DEFAULT_FALLBACK_STORE_CODE.to_string(),
            export_format: ExportFormat::default(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl AllocationConfig {
    pub fn with_store_cap(mut self, store_cap: u32) -> Self {
        self.store_cap = store_cap;
        self
    }

    pub fn with_fallback_store_code(mut self, code: impl Into<String>) -> Self {
        self.fallback_store_code = code.into();
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    /// 校验配置
    ///
    /// - store_cap >= 1
    /// - fallback_store_code 非空
    /// - sheet_name 非空且不超过 31 个字符（Excel 限制）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_cap == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::STORE_CAP.to_string(),
                value: self.store_cap.to_string(),
                message: "单店上限必须 >= 1".to_string(),
            });
        }

        if self.fallback_store_code.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: config_keys::FALLBACK_STORE_CODE.to_string(),
                value: self.fallback_store_code.clone(),
                message: "兜底门店代码不能为空".to_string(),
            });
        }

        let sheet_len = self.sheet_name.chars().count();
        if sheet_len == 0 || sheet_len > 31 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::EXPORT_SHEET_NAME.to_string(),
                value: self.sheet_name.clone(),
                message: "工作表名称长度必须在 1..=31 之间".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AllocationConfig::default();
        assert_eq!(config.store_cap, 3);
        assert_eq!(config.fallback_store_code, "LOJA_PADRAO");
        assert_eq!(config.export_format, ExportFormat::Xlsx);
        assert_eq!(config.sheet_name, "Distribuicao");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = AllocationConfig::default().with_store_cap(0);
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "store_cap"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_blank_fallback() {
        let config = AllocationConfig::default().with_fallback_store_code("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_long_sheet_name() {
        let mut config = AllocationConfig::default();
        config.sheet_name = "x".repeat(32);
        assert!(config.validate().is_err());
    }
}
