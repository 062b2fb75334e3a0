// ==========================================
// 门店物料分配系统 - 当日物料 Repository
// ==========================================
// 职责: material_batch_item 表 CRUD；按日期读出当日批次
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::dq::LoadReport;
use crate::domain::material::{MaterialRequest, StoredMaterial};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::loader_trait::BatchLoader;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

// ==========================================
// MaterialBatchRepository
// ==========================================
pub struct MaterialBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialBatchRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加当日物料（position 接在已有记录之后）
    ///
    /// # 返回
    /// 写入条数
    pub fn insert_batch(
        &self,
        batch_date: NaiveDate,
        materials: &[MaterialRequest],
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let next_position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM material_batch_item WHERE batch_date = ?1",
            params![batch_date],
            |row| row.get(0),
        )?;
        insert_items(&tx, batch_date, next_position, materials)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(batch_date = %batch_date, count = materials.len(), "当日物料已入库");
        Ok(materials.len())
    }

    /// 以新批次整体替换某日物料（删除与写入同一事务，失败时原批次保留）
    ///
    /// # 返回
    /// (删除条数, 写入条数)
    pub fn replace_batch(
        &self,
        batch_date: NaiveDate,
        materials: &[MaterialRequest],
    ) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM material_batch_item WHERE batch_date = ?1",
            params![batch_date],
        )?;
        insert_items(&tx, batch_date, 0, materials)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(batch_date = %batch_date, deleted, count = materials.len(), "当日物料已替换");
        Ok((deleted, materials.len()))
    }

    /// 按上传顺序读出某日物料
    pub fn list_by_date(&self, batch_date: NaiveDate) -> RepositoryResult<Vec<StoredMaterial>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT batch_date, position, product_code, description, quantity
            FROM material_batch_item
            WHERE batch_date = ?1
            ORDER BY position ASC, item_id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![batch_date], |row| {
            let position: i64 = row.get(1)?;
            Ok(StoredMaterial {
                batch_date: row.get(0)?,
                position: position as usize,
                request: MaterialRequest {
                    product_code: row.get(2)?,
                    description: row.get(3)?,
                    quantity: row.get(4)?,
                },
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    pub fn count_by_date(&self, batch_date: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM material_batch_item WHERE batch_date = ?1",
            params![batch_date],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn insert_items(
    tx: &Transaction<'_>,
    batch_date: NaiveDate,
    first_position: i64,
    materials: &[MaterialRequest],
) -> RepositoryResult<()> {
    let created_at = Utc::now().to_rfc3339();
    let mut stmt = tx.prepare(
        r#"
        INSERT INTO material_batch_item (
            batch_date, position, product_code, description, quantity, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )?;
    for (offset, material) in materials.iter().enumerate() {
        stmt.execute(params![
            batch_date,
            first_position + offset as i64,
            material.product_code,
            material.description,
            material.quantity,
            created_at,
        ])?;
    }
    Ok(())
}

// ==========================================
// DailyBatchLoader - 以某日入库物料作为分配输入
// ==========================================
pub struct DailyBatchLoader {
    repo: Arc<MaterialBatchRepository>,
    batch_date: NaiveDate,
}

impl DailyBatchLoader {
    pub fn new(repo: Arc<MaterialBatchRepository>, batch_date: NaiveDate) -> Self {
        Self { repo, batch_date }
    }
}

#[async_trait]
impl BatchLoader for DailyBatchLoader {
    async fn load_batch(&self) -> ImportResult<LoadReport<MaterialRequest>> {
        let items: Vec<MaterialRequest> = self
            .repo
            .list_by_date(self.batch_date)
            .map_err(|e| ImportError::SourceReadError(e.to_string()))?
            .into_iter()
            .map(|stored| stored.request)
            .collect();

        info!(batch_date = %self.batch_date, count = items.len(), "当日物料读取完成");

        Ok(LoadReport {
            total_rows: items.len(),
            items,
            violations: Vec::new(),
        })
    }
}
