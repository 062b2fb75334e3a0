// ==========================================
// 门店物料分配系统 - 分配 API
// ==========================================
// 职责: 加载输入 → 索引 → 分配 → 导出 → 持久化
// 红线: 持久化失败只记录在报告中，已算出的分配结果与导出照常返回
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AllocationConfig, AllocationConfigReader, ConfigManager};
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::dq::{DqViolation, LoadReport};
use crate::domain::material::MaterialRequest;
use crate::domain::types::{ExportFormat, RunPhase};
use crate::engine::{AllocationOutcome, DistributionRun};
use crate::exporter::exporter_for;
use crate::importer::{
    BatchLoader, FileBatchLoader, FileReferenceLoader, ImportError, ReferenceLoader,
};
use crate::perf::PerfGuard;
use crate::repository::{
    DailyBatchLoader, DistributionRepository, DistributionSink, MaterialBatchRepository,
};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// 导出文件的默认名称（不含扩展名）
pub const EXPORT_FILE_STEM: &str = "Distribuicao";

// ==========================================
// 请求 / 响应
// ==========================================

/// 当日物料来源
#[derive(Debug, Clone, PartialEq)]
pub enum BatchSource {
    /// 直接读取上传文件
    File(PathBuf),
    /// 读取某日已入库的物料
    Stored(NaiveDate),
}

/// 命令行等上层对配置的临时覆写
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub store_cap: Option<u32>,
    pub fallback_store_code: Option<String>,
    pub export_format: Option<ExportFormat>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: AllocationConfig) -> AllocationConfig {
        if let Some(cap) = self.store_cap {
            config.store_cap = cap;
        }
        if let Some(code) = &self.fallback_store_code {
            config.fallback_store_code = code.clone();
        }
        if let Some(format) = self.export_format {
            config.export_format = format;
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct DistributionRequest {
    pub reference_path: PathBuf,
    pub batch: BatchSource,
    pub run_date: NaiveDate,
    pub overrides: ConfigOverrides,
    pub persist: bool,
}

impl DistributionRequest {
    pub fn new(reference_path: impl Into<PathBuf>, batch: BatchSource) -> Self {
        Self {
            reference_path: reference_path.into(),
            batch,
            run_date: Local::now().date_naive(),
            overrides: ConfigOverrides::default(),
            persist: true,
        }
    }
}

/// 加载摘要
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub total_rows: usize,
    pub loaded: usize,
    pub violations: Vec<DqViolation>,
}

impl<T> From<&LoadReport<T>> for LoadSummary {
    fn from(report: &LoadReport<T>) -> Self {
        Self {
            total_rows: report.total_rows,
            loaded: report.items.len(),
            violations: report.violations.clone(),
        }
    }
}

/// 导出产物
#[derive(Debug, Clone, Serialize)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub file_name: String,
    pub content_type: &'static str,
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// 单次分配运行报告
#[derive(Debug, Clone, Serialize)]
pub struct DistributionRunReport {
    pub run_id: String,
    pub run_date: NaiveDate,
    pub config: AllocationConfig,
    pub reference: LoadSummary,
    pub batch: LoadSummary,
    pub outcome: AllocationOutcome,
    pub export: ExportArtifact,
    pub persisted: bool,
    pub persistence_error: Option<String>,
}

/// 当日物料入库报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchImportReport {
    pub batch_date: NaiveDate,
    pub imported: usize,
    pub replaced: usize,
    pub summary: LoadSummary,
}

// ==========================================
// DistributionApi
// ==========================================
pub struct DistributionApi {
    config: Arc<ConfigManager>,
    batch_repo: Arc<MaterialBatchRepository>,
    distribution_repo: Arc<DistributionRepository>,
}

impl DistributionApi {
    /// 打开数据库（建表幂等），各仓储共享同一连接
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        info!(db_path, "数据库已就绪");
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 内存数据库（测试 / 一次性运行）
    pub fn in_memory() -> ApiResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            config: Arc::new(ConfigManager::from_connection(conn.clone())),
            batch_repo: Arc::new(MaterialBatchRepository::from_connection(conn.clone())),
            distribution_repo: Arc::new(DistributionRepository::from_connection(conn)),
        }
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config
    }

    pub fn distribution_repo(&self) -> &DistributionRepository {
        &self.distribution_repo
    }

    pub fn batch_repo(&self) -> &MaterialBatchRepository {
        &self.batch_repo
    }

    // ==========================================
    // 当日物料入库
    // ==========================================

    /// 读取物料文件并写入某日批次
    ///
    /// # 参数
    /// - file_path: 物料文件（.xlsx/.xls/.csv）
    /// - batch_date: 批次日期
    /// - replace: 是否以本文件整体替换当日已有物料（同一事务）
    pub async fn import_batch(
        &self,
        file_path: &Path,
        batch_date: NaiveDate,
        replace: bool,
    ) -> ApiResult<BatchImportReport> {
        let _perf = PerfGuard::new("distribution_api.import_batch");

        let report = FileBatchLoader::new(file_path).load_batch().await?;
        if report.items.is_empty() {
            return Err(ImportError::EmptySource(format!(
                "物料文件无数据行: {}",
                file_path.display()
            ))
            .into());
        }

        let (replaced, imported) = if replace {
            self.batch_repo.replace_batch(batch_date, &report.items)?
        } else {
            (0, self.batch_repo.insert_batch(batch_date, &report.items)?)
        };

        info!(batch_date = %batch_date, imported, replaced, "当日物料导入完成");

        Ok(BatchImportReport {
            batch_date,
            imported,
            replaced,
            summary: LoadSummary::from(&report),
        })
    }

    // ==========================================
    // 分配运行
    // ==========================================

    /// 按请求执行一次完整分配
    pub async fn run_distribution(
        &self,
        request: &DistributionRequest,
    ) -> ApiResult<DistributionRunReport> {
        let config = request
            .overrides
            .apply(self.config.load_allocation_config().await?);
        config.validate()?;

        let reference = FileReferenceLoader::new(&request.reference_path);
        let batch: Box<dyn BatchLoader> = match &request.batch {
            BatchSource::File(path) => Box::new(FileBatchLoader::new(path)),
            BatchSource::Stored(date) => {
                Box::new(DailyBatchLoader::new(self.batch_repo.clone(), *date))
            }
        };
        let sink: Option<&dyn DistributionSink> = if request.persist {
            Some(self.distribution_repo.as_ref())
        } else {
            None
        };

        run_with(&reference, batch.as_ref(), sink, config, request.run_date).await
    }
}

// ==========================================
// 运行主流程（与具体数据源解耦）
// ==========================================

/// 加载 → 索引 → 分配 → 导出 → 持久化
///
/// 两个输入并发加载；持久化发生在导出之后，失败只记录不回滚。
pub async fn run_with(
    reference: &dyn ReferenceLoader,
    batch: &dyn BatchLoader,
    sink: Option<&dyn DistributionSink>,
    config: AllocationConfig,
    run_date: NaiveDate,
) -> ApiResult<DistributionRunReport> {
    let _perf = PerfGuard::new("distribution_api.run");

    let (reference_report, batch_report): (_, LoadReport<MaterialRequest>) =
        futures::try_join!(reference.load_reference(), batch.load_batch())?;

    // 任一输入为空则不运行，不产生空的分配表与运行记录
    if batch_report.items.is_empty() {
        return Err(ImportError::EmptySource(format!("未找到 {} 的物料", run_date)).into());
    }
    if reference_report.items.is_empty() {
        return Err(ImportError::EmptySource(format!(
            "参考数据无有效记录（共 {} 行，跳过 {} 行）",
            reference_report.total_rows,
            reference_report.skipped()
        ))
        .into());
    }

    let reference_summary = LoadSummary::from(&reference_report);
    let batch_summary = LoadSummary::from(&batch_report);

    let mut run = DistributionRun::new(&config);
    let run_id = run.run_id().to_string();
    info!(
        run_id = %run_id,
        run_date = %run_date,
        observations = reference_report.items.len(),
        materials = batch_report.items.len(),
        "分配运行开始"
    );

    run.build_index(reference_report.items)?;
    run.allocate(&batch_report.items)?;

    let exporter = exporter_for(&config);
    let bytes = run.export(exporter.as_ref())?;
    debug_assert_eq!(run.phase(), RunPhase::Completed);

    let outcome = run
        .into_outcome()
        .ok_or_else(|| anyhow::anyhow!("运行 {} 未产生分配结果", run_id))?;

    if !outcome.is_complete() {
        warn!(run_id = %run_id, failures = outcome.failures.len(), "部分物料被拒绝");
    }

    let (persisted, persistence_error) = match sink {
        Some(sink) => match sink.persist(&run_id, run_date, &outcome).await {
            Ok(_) => (true, None),
            Err(e) => {
                error!(run_id = %run_id, error = %e, "分配结果持久化失败");
                (false, Some(e.to_string()))
            }
        },
        None => (false, None),
    };

    let format = config.export_format;
    let export = ExportArtifact {
        format,
        file_name: format!("{}.{}", EXPORT_FILE_STEM, format.extension()),
        content_type: format.content_type(),
        size_bytes: bytes.len(),
        bytes,
    };

    info!(
        run_id = %run_id,
        records = outcome.records.len(),
        failures = outcome.failures.len(),
        fallback_count = outcome.fallback_count,
        persisted,
        "分配运行完成"
    );

    Ok(DistributionRunReport {
        run_id,
        run_date,
        config,
        reference: reference_summary,
        batch: batch_summary,
        outcome,
        export,
        persisted,
        persistence_error,
    })
}
