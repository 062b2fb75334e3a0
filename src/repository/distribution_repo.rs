// ==========================================
// 门店物料分配系统 - 分配结果 Repository
// ==========================================
// 职责: distribution_run / distribution_item / distribution_failure 表读写
// 红线: 单次运行的表头、明细与拒绝记录在同一事务内写入
// ==========================================

use crate::domain::distribution::DistributionRecord;
use crate::engine::allocation::AllocationOutcome;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

// ==========================================
// DistributionSink Trait
// ==========================================
// 实现者: DistributionRepository
#[async_trait]
pub trait DistributionSink: Send + Sync {
    /// 持久化一次分配运行
    ///
    /// # 返回
    /// 写入的明细条数（不含拒绝记录）
    async fn persist(
        &self,
        run_id: &str,
        run_date: NaiveDate,
        outcome: &AllocationOutcome,
    ) -> RepositoryResult<usize>;
}

// ==========================================
// DistributionRunSummary - 运行表头
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRunSummary {
    pub run_id: String,
    pub run_date: NaiveDate,
    pub material_count: usize, // 输入物料总数
    pub record_count: usize,   // 成功分配
    pub failure_count: usize,  // 被拒绝
    pub fallback_count: usize,
    pub created_at: String,
}

// ==========================================
// StoredFailure - 被拒绝的物料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFailure {
    pub position: usize,
    pub product_code: String,
    pub description: String,
    pub quantity: f64,
    pub reason: String,
}

// ==========================================
// DistributionRepository
// ==========================================
pub struct DistributionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DistributionRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入表头、明细与拒绝记录
    pub fn save_run(
        &self,
        run_id: &str,
        run_date: NaiveDate,
        outcome: &AllocationOutcome,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO distribution_run (
                run_id, run_date, material_count, record_count, failure_count,
                fallback_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                run_id,
                run_date,
                outcome.processed() as i64,
                outcome.records.len() as i64,
                outcome.failures.len() as i64,
                outcome.fallback_count as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO distribution_item (
                    run_id, position, store_code, product_code, description, total_quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for (decision, record) in outcome.decisions.iter().zip(&outcome.records) {
                stmt.execute(params![
                    run_id,
                    decision.position as i64,
                    record.store_code,
                    record.product_code,
                    record.description,
                    record.total_quantity,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO distribution_failure (
                    run_id, position, product_code, description, quantity, reason
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for failure in &outcome.failures {
                stmt.execute(params![
                    run_id,
                    failure.position as i64,
                    failure.request.product_code,
                    failure.request.description,
                    failure.request.quantity,
                    failure.error.to_string(),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            run_id,
            run_date = %run_date,
            items = outcome.records.len(),
            failures = outcome.failures.len(),
            "分配结果已持久化"
        );
        Ok(outcome.records.len())
    }

    pub fn find_run(&self, run_id: &str) -> RepositoryResult<Option<DistributionRunSummary>> {
        let conn = self.get_conn()?;
        let summary = conn
            .query_row(
                r#"
                SELECT run_id, run_date, material_count, record_count, failure_count,
                       fallback_count, created_at
                FROM distribution_run WHERE run_id = ?1
                "#,
                params![run_id],
                map_summary,
            )
            .optional()?;
        Ok(summary)
    }

    /// 某日全部运行（按创建时间）
    pub fn list_runs_by_date(&self, run_date: NaiveDate) -> RepositoryResult<Vec<DistributionRunSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, run_date, material_count, record_count, failure_count,
                   fallback_count, created_at
            FROM distribution_run WHERE run_date = ?1
            ORDER BY created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![run_date], map_summary)?;
        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }

    /// 读出某次运行的明细（按输入位置）
    pub fn list_run_items(&self, run_id: &str) -> RepositoryResult<Vec<DistributionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT store_code, product_code, description, total_quantity
            FROM distribution_item WHERE run_id = ?1
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(DistributionRecord {
                store_code: row.get(0)?,
                product_code: row.get(1)?,
                description: row.get(2)?,
                total_quantity: row.get(3)?,
            })
        })?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// 读出某次运行被拒绝的物料（按输入位置）
    pub fn list_run_failures(&self, run_id: &str) -> RepositoryResult<Vec<StoredFailure>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT position, product_code, description, quantity, reason
            FROM distribution_failure WHERE run_id = ?1
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            let position: i64 = row.get(0)?;
            Ok(StoredFailure {
                position: position as usize,
                product_code: row.get(1)?,
                description: row.get(2)?,
                quantity: row.get(3)?,
                reason: row.get(4)?,
            })
        })?;
        let mut failures = Vec::new();
        for row in rows {
            failures.push(row?);
        }
        Ok(failures)
    }
}

fn map_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<DistributionRunSummary> {
    let count = |idx: usize| -> rusqlite::Result<usize> { Ok(row.get::<_, i64>(idx)? as usize) };
    Ok(DistributionRunSummary {
        run_id: row.get(0)?,
        run_date: row.get(1)?,
        material_count: count(2)?,
        record_count: count(3)?,
        failure_count: count(4)?,
        fallback_count: count(5)?,
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl DistributionSink for DistributionRepository {
    async fn persist(
        &self,
        run_id: &str,
        run_date: NaiveDate,
        outcome: &AllocationOutcome,
    ) -> RepositoryResult<usize> {
        self.save_run(run_id, run_date, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllocationConfig;
    use crate::domain::material::MaterialRequest;
    use crate::domain::reference::ReferenceObservation;
    use crate::db::init_schema;
    use crate::engine::{AllocationEngine, ReferenceIndex};

    fn repo() -> DistributionRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        DistributionRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn outcome() -> AllocationOutcome {
        let index = ReferenceIndex::build(vec![ReferenceObservation::new("S1", "A", 0.1, 1.0)]);
        let materials = vec![
            MaterialRequest::new("A", "Arroz", 2.0),
            MaterialRequest::new("", "inválido", 1.0),
            MaterialRequest::new("X", "Sem ref", 1.5),
        ];
        AllocationEngine::new(&AllocationConfig::default())
            .allocate(&materials, &index)
            .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let repo = repo();
        let outcome = outcome();

        let written = repo.persist("run-1", today(), &outcome).await.unwrap();
        assert_eq!(written, 2);

        assert_eq!(repo.list_run_items("run-1").unwrap(), outcome.records);

        let summary = repo.find_run("run-1").unwrap().unwrap();
        assert_eq!(summary.material_count, 3);
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.fallback_count, 1);

        let failures = repo.list_run_failures("run-1").unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].position, 1);
        assert_eq!(failures[0].description, "inválido");
        assert!(!failures[0].reason.is_empty());
        assert_eq!(summary.run_date, today());
        assert_eq!(repo.list_runs_by_date(today()).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_run_id_is_rejected_atomically() {
        let repo = repo();
        let outcome = outcome();
        repo.save_run("run-1", today(), &outcome).unwrap();

        let err = repo.save_run("run-1", today(), &outcome).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
        assert_eq!(repo.list_run_items("run-1").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_run() {
        let repo = repo();
        assert!(repo.find_run("nope").unwrap().is_none());
        assert!(repo.list_run_items("nope").unwrap().is_empty());
        assert!(repo.list_run_failures("nope").unwrap().is_empty());
    }
}
