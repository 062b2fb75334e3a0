// ==========================================
// 门店物料分配系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.ods) / CSV (.csv)
// 输出: 表头列表 + 按列顺序保存的原始行（保留文件行号）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Range, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

// ==========================================
// RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub row_number: usize,             // 文件行号（表头为第 1 行）
    pub fields: Vec<(String, String)>, // (表头, 值)，按列顺序
}

impl RawRow {
    /// 按表头取值；同名表头取最左列
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// 忽略大小写按表头取值；按列顺序取第一个命中
    pub fn get_ignore_case(&self, header: &str) -> Option<&str> {
        let wanted = header.to_lowercase();
        self.fields
            .iter()
            .find(|(h, _)| h.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }
}

// ==========================================
// ParsedSheet - 解析结果
// ==========================================
/// 表头独立保存：必需列校验以表头为准，与数据行是否完整无关
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedSheet {
    /// 表头中是否存在任一别名（忽略大小写）
    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.headers.iter().any(|header| {
            let header = header.to_lowercase();
            aliases.iter().any(|alias| alias.to_lowercase() == header)
        })
    }
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<ParsedSheet>;
}

/// 检查文件存在
fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意读取器解析（导出回读测试也走这里）
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<ParsedSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row = RawRow {
                // 表头占第 1 行
                row_number: record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(row_idx + 2),
                fields: Vec::with_capacity(headers.len()),
            };

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row.fields.push((header.clone(), value.trim().to_string()));
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }

            records.push(row);
        }

        Ok(ParsedSheet {
            headers,
            rows: records,
        })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读取第一个工作表
pub struct ExcelParser;

impl ExcelParser {
    /// 从内存中的 xlsx 字节解析
    pub fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;
        Ok(rows_from_range(&range))
    }
}

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;
        Ok(rows_from_range(&range))
    }
}

/// 第一行为表头，其余为数据行；空白行跳过
fn rows_from_range(range: &Range<Data>) -> ParsedSheet {
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        None => return ParsedSheet::default(),
    };

    let mut records = Vec::new();
    for (idx, data_row) in rows.enumerate() {
        let mut row = RawRow {
            row_number: first_row + idx + 2,
            fields: Vec::with_capacity(headers.len()),
        };

        for (col_idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.fields
                    .push((header.clone(), cell.to_string().trim().to_string()));
            }
        }

        if row.is_blank() {
            continue;
        }

        records.push(row);
    }

    ParsedSheet {
        headers,
        rows: records,
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedSheet> {
        let path = file_path.as_ref();
        match extension_of(path).as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelParser.parse_to_raw_records(path),
            other => {
                ensure_exists(path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}
