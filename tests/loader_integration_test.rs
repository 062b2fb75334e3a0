// ==========================================
// 加载器集成测试
// ==========================================
// 测试目标: xlsx/csv 输入、列名别名、DQ 跳过与兜底
// ==========================================

mod test_helpers;

use material_distributor::domain::types::DqLevel;
use material_distributor::importer::{
    BatchLoader, FileBatchLoader, FileReferenceLoader, ImportError, ReferenceLoader,
};
use test_helpers::{temp_dir, write_csv, write_xlsx, Cell, BATCH_HEADERS, REFERENCE_HEADERS};

#[tokio::test]
async fn test_reference_xlsx_with_numeric_codes() {
    let dir = temp_dir();
    let path = write_xlsx(
        dir.path(),
        "referencia.xlsx",
        &REFERENCE_HEADERS,
        &[
            vec![Cell::Text("S1"), Cell::Number(1001.0), Cell::Number(0.25), Cell::Number(1500.0)],
            vec![Cell::Text("S2"), Cell::Text("1001"), Cell::Text("0,1"), Cell::Text("900")],
            vec![Cell::Text("S3"), Cell::Number(1002.0), Cell::Text("-"), Cell::Number(10.0)],
        ],
    );

    let report = FileReferenceLoader::new(&path).load_reference().await.unwrap();

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.items.len(), 2);
    assert!(report.items.iter().all(|o| o.product_code == "1001"));
    assert_eq!(report.items[1].loss, 0.1);

    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.row_number, 4);
    assert_eq!(violation.field, "loss");
    assert_eq!(violation.level, DqLevel::Error);
}

#[tokio::test]
async fn test_reference_csv_with_english_headers() {
    let dir = temp_dir();
    let path = write_csv(
        dir.path(),
        "reference.csv",
        &["store_code", "product_code", "loss", "gross_revenue"],
        &[vec!["S1", "A", "0.3", "10"], vec!["S2", "A", "0.1", "5"]],
    );

    let report = FileReferenceLoader::new(&path).load_reference().await.unwrap();
    assert_eq!(report.items.len(), 2);
    assert_eq!(report.skipped(), 0);
}

#[tokio::test]
async fn test_batch_xlsx_keeps_order_and_coerces() {
    let dir = temp_dir();
    let path = write_xlsx(
        dir.path(),
        "materiais.xlsx",
        &BATCH_HEADERS,
        &[
            vec![Cell::Number(1001.0), Cell::Text("Arroz"), Cell::Number(12.0)],
            vec![Cell::Number(1002.0), Cell::Text(""), Cell::Text("doze")],
            vec![Cell::Number(1003.0), Cell::Text("Café"), Cell::Number(2.5)],
        ],
    );

    let report = FileBatchLoader::new(&path).load_batch().await.unwrap();

    let codes: Vec<&str> = report.items.iter().map(|m| m.product_code.as_str()).collect();
    assert_eq!(codes, vec!["1001", "1002", "1003"]);
    assert_eq!(report.items[0].quantity, 12.0);
    assert_eq!(report.items[1].quantity, 0.0);
    assert_eq!(report.items[1].description, "");
    assert_eq!(report.items[2].quantity, 2.5);
    assert!(report.violations.iter().all(|v| v.level == DqLevel::Warning));
    assert_eq!(report.skipped(), 0);
}

#[tokio::test]
async fn test_batch_without_code_column_is_rejected() {
    let dir = temp_dir();
    let path = write_csv(
        dir.path(),
        "materiais.csv",
        &["PRODUTO", "QUANTIDADE"],
        &[vec!["1001", "1"]],
    );

    let result = FileBatchLoader::new(&path).load_batch().await;
    assert!(matches!(result, Err(ImportError::MissingColumn { .. })));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let dir = temp_dir();
    let path = dir.path().join("referencia.txt");
    std::fs::write(&path, "Cod;Perda\n").unwrap();

    let result = FileReferenceLoader::new(&path).load_reference().await;
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}
