// ==========================================
// 游泳比赛编组系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx，每个工作表一个项目) / CSV (.csv，单一项目)
// 不支持: 旧版 .xls（明确报错）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

// ==========================================
// RawSheet - 未经映射的表格数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSheet {
    pub name: String,           // 工作表名（CSV 为文件名主干）
    pub rows: Vec<Vec<String>>, // 全部行（含表头前的标题行），单元格已 trim
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser {
    /// 读取文件中的全部表格
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>>;
}

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

impl FileParser for CsvParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头位置由字段映射器探测
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        let name = file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        debug!(sheet = %name, rows = rows.len(), "CSV 读取完成");
        Ok(vec![RawSheet { name, rows }])
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        match extension_of(file_path).as_str() {
            "xlsx" | "xlsm" => {}
            "xls" => {
                return Err(ImportError::LegacyExcelFormat(file_path.display().to_string()));
            }
            other => return Err(ImportError::UnsupportedFormat(other.to_string())),
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_to_string).collect())
                .collect();

            debug!(sheet = %sheet_name, rows = rows.len(), "工作表读取完成");
            sheets.push(RawSheet {
                name: sheet_name,
                rows,
            });
        }

        if sheets.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        Ok(sheets)
    }
}

/// 单元格转文本
///
/// 数值单元格: 整数值按整数输出（年份、秒数），其余保留两位小数，
/// 避免二进制浮点误差（31.499999 → "31.50"）在时间解析时被截断
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => format!("{:.2}", f),
        other => other.to_string().trim().to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_sheets(file_path),
            // .xls 也交给 ExcelParser，由其给出明确的旧格式错误
            "xlsx" | "xlsm" | "xls" => ExcelParser.parse_sheets(file_path),
            other => {
                ensure_exists(file_path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_keeps_all_rows() {
        let file = csv_file("Start list\nName,Year\n Ann ,2010\n");
        let sheets = CsvParser.parse_sheets(file.path()).unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].rows.len(), 3);
        assert_eq!(sheets[0].rows[2], vec!["Ann", "2010"]);

        let stem = file.path().file_stem().unwrap().to_string_lossy().to_string();
        assert_eq!(sheets[0].name, stem);
    }

    #[test]
    fn test_file_not_found() {
        let result = UniversalFileParser.parse_sheets(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_legacy_xls_rejected() {
        let mut file = Builder::new().suffix(".xls").tempfile().unwrap();
        write!(file, "legacy excel").unwrap();

        let err = UniversalFileParser.parse_sheets(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::LegacyExcelFormat(_)));
        assert!(err.to_string().contains(".xls"));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "x").unwrap();

        let result = UniversalFileParser.parse_sheets(file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_numeric_cells() {
        assert_eq!(cell_to_string(&Data::Float(2010.0)), "2010");
        assert_eq!(cell_to_string(&Data::Float(31.499999)), "31.50");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String("  Ann ".to_string())), "Ann");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_broken_xlsx_is_parse_error() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        write!(file, "not a zip").unwrap();

        let result = UniversalFileParser.parse_sheets(file.path());
        assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
    }
}
