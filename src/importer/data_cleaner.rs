// ==========================================
// 门店物料分配系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 代码规整 / 数值解析
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    /// 空白视为 NULL
    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 规整产品/门店代码
    ///
    /// Excel 将纯数字代码存为浮点数，读出后形如 "1001.0"，此处还原为 "1001"。
    pub fn normalize_code(&self, value: &str) -> String {
        let trimmed = value.trim();
        if let Some(int_part) = trimmed.strip_suffix(".0") {
            if !int_part.is_empty() && int_part.chars().all(|c| c.is_ascii_digit()) {
                return int_part.to_string();
            }
        }
        trimmed.to_string()
    }

    /// 解析数值，兼容小数逗号（"2,5"）与千分位（"1.234,56" / "1,234.56"）
    ///
    /// 同时出现 '.' 与 ',' 时，最后出现的一个为小数点，另一个为千分位。
    /// 空值、无法解析或非有限值返回 None。
    pub fn parse_decimal(&self, value: &str) -> Option<f64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }

        let normalized = match (trimmed.rfind('.'), trimmed.rfind(',')) {
            (Some(dot), Some(comma)) if dot > comma => trimmed.replace(',', ""),
            (Some(_), Some(_)) => trimmed.replace('.', "").replace(',', "."),
            (None, Some(_)) => trimmed.replace(',', "."),
            _ => trimmed.to_string(),
        };

        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(
            cleaner.normalize_null(Some(" Arroz ".to_string())),
            Some("Arroz".to_string())
        );
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_normalize_code() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_code(" 1001.0 "), "1001");
        assert_eq!(cleaner.normalize_code("1001"), "1001");
        assert_eq!(cleaner.normalize_code("AB.0"), "AB.0");
        assert_eq!(cleaner.normalize_code("10.05"), "10.05");
    }

    #[test]
    fn test_parse_decimal_last_separator_is_decimal_point() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_decimal("1,234.56"), Some(1234.56));
        assert_eq!(cleaner.parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(cleaner.parse_decimal("12,345,678.9"), Some(12345678.9));
    }

    #[test]
    fn test_parse_decimal() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_decimal("2.5"), Some(2.5));
        assert_eq!(cleaner.parse_decimal("2,5"), Some(2.5));
        assert_eq!(cleaner.parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(cleaner.parse_decimal("-0.75"), Some(-0.75));
        assert_eq!(cleaner.parse_decimal("1.234.567,8"), Some(1234567.8));
        assert_eq!(cleaner.parse_decimal("2,5,1"), None);
        assert_eq!(cleaner.parse_decimal(""), None);
        assert_eq!(cleaner.parse_decimal("abc"), None);
        assert_eq!(cleaner.parse_decimal("NaN"), None);
        assert_eq!(cleaner.parse_decimal("inf"), None);
    }
}
