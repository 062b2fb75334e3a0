// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、参考数据/物料文件夹具
// ==========================================

#![allow(dead_code)]

use material_distributor::db::{init_schema, open_sqlite_connection};
use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// 参考数据表头（与业务方导出的表格一致）
pub const REFERENCE_HEADERS: [&str; 4] = ["Cod", "Cód. Produto", "Perda", "Receita Bruta"];

/// 物料清单表头
pub const BATCH_HEADERS: [&str; 3] = ["CÓDIGO", "DESCRIÇÃO", "QUANTIDADE"];

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 写入 CSV 文件（第一行为表头）
pub fn write_csv(dir: &Path, name: &str, headers: &[&str], rows: &[Vec<&str>]) -> PathBuf {
    let path = dir.join(name);
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(headers).unwrap();
    for row in rows {
        wtr.write_record(row).unwrap();
    }
    wtr.flush().unwrap();
    path
}

/// 单元格
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

/// 写入单工作表 xlsx 文件
pub fn write_xlsx(dir: &Path, name: &str, headers: &[&str], rows: &[Vec<Cell<'_>>]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (row_idx, col_idx) = ((r + 1) as u32, c as u16);
            match cell {
                Cell::Text(s) => sheet.write_string(row_idx, col_idx, *s).unwrap(),
                Cell::Number(n) => sheet.write_number(row_idx, col_idx, *n).unwrap(),
            };
        }
    }

    workbook.save(&path).unwrap();
    path
}

/// 标准参考数据：
/// - 产品 A: S1(0.5), S2(0.2), S3(0.2, 收入更高)
/// - 产品 B: 仅 S2
pub fn write_reference_csv(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "referencia.csv",
        &REFERENCE_HEADERS,
        &[
            vec!["S1", "A", "0.5", "1000"],
            vec!["S2", "A", "0.2", "300"],
            vec!["S3", "A", "0.2", "900"],
            vec!["S2", "B", "0.1", "50"],
        ],
    )
}

pub fn temp_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}
