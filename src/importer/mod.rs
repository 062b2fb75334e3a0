// ==========================================
// 门店物料分配系统 - 导入层
// ==========================================
// 职责: 参考数据 / 当日物料 → 领域对象
// 流程: 文件解析 → 字段映射 → 清洗 → LoadReport
// ==========================================

pub mod batch_loader;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod loader_trait;
pub mod reference_loader;

pub use batch_loader::FileBatchLoader;
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{
    CsvParser, ExcelParser, FileParser, ParsedSheet, RawRow, UniversalFileParser,
};
pub use loader_trait::{BatchLoader, ReferenceLoader};
pub use reference_loader::FileReferenceLoader;
