// ==========================================
// 门店物料分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope，当前仅使用 global)
// ==========================================

use crate::config::allocation_config::{
    AllocationConfig, DEFAULT_FALLBACK_STORE_CODE, DEFAULT_SHEET_NAME, DEFAULT_STORE_CAP,
};
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::ExportFormat;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 用途: 分配流程所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    /// 单店上限（默认 3）
    async fn get_store_cap(&self) -> ConfigResult<u32>;

    /// 兜底门店代码（默认 LOJA_PADRAO）
    async fn get_fallback_store_code(&self) -> ConfigResult<String>;

    /// 导出格式（默认 xlsx）
    async fn get_export_format(&self) -> ConfigResult<ExportFormat>;

    /// 导出工作表名（默认 Distribuicao）
    async fn get_export_sheet_name(&self) -> ConfigResult<String>;

    /// 组合为完整配置（不校验，调用方叠加覆写后再 validate）
    async fn load_allocation_config(&self) -> ConfigResult<AllocationConfig> {
        Ok(AllocationConfig {
            store_cap: self.get_store_cap().await?,
            fallback_store_code: self.get_fallback_store_code().await?,
            export_format: self.get_export_format().await?,
            sheet_name: self.get_export_sheet_name().await?,
        })
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self, key: &str) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| ConfigError::ReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock(key)?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ConfigError::ReadError {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock(key)?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )
        .map_err(|e| ConfigError::WriteError {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 列出所有 global 配置（按 key 排序）
    pub fn list_global_configs(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.lock("*")?;
        let read_err = |e: rusqlite::Error| ConfigError::ReadError {
            key: "*".to_string(),
            message: e.to_string(),
        };

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")
            .map_err(read_err)?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(read_err)?;

        let mut configs = BTreeMap::new();
        for row in rows {
            let (key, value) = row.map_err(read_err)?;
            configs.insert(key, value);
        }
        Ok(configs)
    }

    /// 校验后写入分配配置项（`config set` 入口）
    ///
    /// 值先套到默认配置上做字段级校验，只校验本次写入的键；
    /// 通过后以规整后的形式写入。
    pub fn set_allocation_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let trimmed = value.trim();
        let mut candidate = AllocationConfig::default();
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message,
        };

        let stored = match key {
            config_keys::STORE_CAP => {
                candidate.store_cap = trimmed
                    .parse::<u32>()
                    .map_err(|e| invalid(format!("不是非负整数: {}", e)))?;
                candidate.store_cap.to_string()
            }
            config_keys::FALLBACK_STORE_CODE => {
                candidate.fallback_store_code = trimmed.to_string();
                trimmed.to_string()
            }
            config_keys::EXPORT_FORMAT => {
                candidate.export_format = trimmed.parse::<ExportFormat>().map_err(invalid)?;
                candidate.export_format.to_string()
            }
            config_keys::EXPORT_SHEET_NAME => {
                candidate.sheet_name = trimmed.to_string();
                trimmed.to_string()
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                    available: config_keys::ALL.join(", "),
                })
            }
        };

        candidate.validate()?;
        self.set_global_config_value(key, &stored)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_store_cap(&self) -> ConfigResult<u32> {
        let value = self.get_config_or_default(config_keys::STORE_CAP, "3")?;
        match value.trim().parse::<u32>() {
            Ok(cap) => Ok(cap),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::STORE_CAP,
                    raw_value = %value,
                    "单店上限配置格式错误，使用默认值"
                );
                Ok(DEFAULT_STORE_CAP)
            }
        }
    }

    async fn get_fallback_store_code(&self) -> ConfigResult<String> {
        let value =
            self.get_config_or_default(config_keys::FALLBACK_STORE_CODE, DEFAULT_FALLBACK_STORE_CODE)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_FALLBACK_STORE_CODE.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_export_format(&self) -> ConfigResult<ExportFormat> {
        let value = self.get_config_or_default(config_keys::EXPORT_FORMAT, "xlsx")?;
        match value.parse::<ExportFormat>() {
            Ok(format) => Ok(format),
            Err(message) => {
                tracing::warn!(
                    config_key = config_keys::EXPORT_FORMAT,
                    raw_value = %value,
                    %message,
                    "导出格式配置错误，使用默认值"
                );
                Ok(ExportFormat::default())
            }
        }
    }

    async fn get_export_sheet_name(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::EXPORT_SHEET_NAME, DEFAULT_SHEET_NAME)?;
        Ok(value.trim().to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 分配
    pub const STORE_CAP: &str = "store_cap";
    pub const FALLBACK_STORE_CODE: &str = "fallback_store_code";

    // 导出
    pub const EXPORT_FORMAT: &str = "export_format";
    pub const EXPORT_SHEET_NAME: &str = "export_sheet_name";

    /// 允许通过 `config set` 写入的键
    pub const ALL: &[&str] = &[STORE_CAP, FALLBACK_STORE_CODE, EXPORT_FORMAT, EXPORT_SHEET_NAME];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_defaults_when_table_empty() {
        let manager = in_memory_manager();
        let config = manager.load_allocation_config().await.unwrap();
        assert_eq!(config, AllocationConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_from_config_kv() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::STORE_CAP, "5").unwrap();
        manager
            .set_global_config_value(config_keys::FALLBACK_STORE_CODE, "CD01")
            .unwrap();
        manager.set_global_config_value(config_keys::EXPORT_FORMAT, "csv").unwrap();

        let config = manager.load_allocation_config().await.unwrap();
        assert_eq!(config.store_cap, 5);
        assert_eq!(config.fallback_store_code, "CD01");
        assert_eq!(config.export_format, ExportFormat::Csv);
    }

    #[tokio::test]
    async fn test_malformed_cap_falls_back_to_default() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::STORE_CAP, "abc").unwrap();
        assert_eq!(manager.get_store_cap().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stored_zero_cap_is_loaded_for_later_validation() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::STORE_CAP, "0").unwrap();

        let config = manager.load_allocation_config().await.unwrap();
        assert_eq!(config.store_cap, 0);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_malformed_format_falls_back_to_default() {
        let manager = in_memory_manager();
        manager.set_global_config_value(config_keys::EXPORT_FORMAT, "pdf").unwrap();
        assert_eq!(manager.get_export_format().await.unwrap(), ExportFormat::Xlsx);
    }

    #[tokio::test]
    async fn test_set_allocation_value_validates_and_normalizes() {
        let manager = in_memory_manager();

        manager.set_allocation_value(config_keys::STORE_CAP, " 5 ").unwrap();
        manager.set_allocation_value(config_keys::EXPORT_FORMAT, "CSV").unwrap();
        assert_eq!(
            manager.get_global_config_value(config_keys::STORE_CAP).unwrap(),
            Some("5".to_string())
        );
        assert_eq!(
            manager.get_global_config_value(config_keys::EXPORT_FORMAT).unwrap(),
            Some("csv".to_string())
        );

        for (key, value) in [
            (config_keys::STORE_CAP, "0"),
            (config_keys::STORE_CAP, "três"),
            (config_keys::EXPORT_FORMAT, "pdf"),
            (config_keys::FALLBACK_STORE_CODE, "   "),
            (config_keys::EXPORT_SHEET_NAME, ""),
        ] {
            let err = manager.set_allocation_value(key, value).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{key}={value:?}");
        }

        // 被拒绝的写入不改变已存值
        let config = manager.load_allocation_config().await.unwrap();
        assert_eq!(config.store_cap, 5);
        assert_eq!(config.export_format, ExportFormat::Csv);
        assert_eq!(config.fallback_store_code, "LOJA_PADRAO");
    }

    #[test]
    fn test_set_allocation_value_rejects_unknown_key() {
        let manager = in_memory_manager();
        let err = manager.set_allocation_value("store_limit", "3").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { key, .. } if key == "store_limit"));
        assert!(manager.list_global_configs().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_and_list() {
        let manager = in_memory_manager();
        manager.set_global_config_value("store_cap", "4").unwrap();
        manager.set_global_config_value("store_cap", "6").unwrap();

        assert_eq!(
            manager.get_global_config_value("store_cap").unwrap(),
            Some("6".to_string())
        );

        let configs = manager.list_global_configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs["store_cap"], "6");
    }
}
