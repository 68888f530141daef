// ==========================================
// 游泳比赛编组系统 - 出发名单导入器
// ==========================================
// 流程: 文件解析 → 表头探测 → 行映射 → 按项目分组
// 输出: StartlistImport（项目名 → 参赛者记录）
// ==========================================
// 红线: 导入器不写库、不编组
// ==========================================

use crate::domain::competitor::{ImportedEntry, StartlistImport};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{FileParser, RawSheet, UniversalFileParser};
use std::path::Path;
use tracing::{info, instrument, warn};

pub struct StartlistImporter<P: FileParser = UniversalFileParser> {
    parser: P,
    mapper: FieldMapper,
}

impl StartlistImporter<UniversalFileParser> {
    pub fn new() -> Self {
        Self::with_parser(UniversalFileParser)
    }
}

impl Default for StartlistImporter<UniversalFileParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FileParser> StartlistImporter<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            mapper: FieldMapper,
        }
    }

    /// 导入出发名单文件
    ///
    /// - 每个工作表是一个项目（工作表名 = 项目名）
    /// - 没有姓名列或没有参赛者的工作表被跳过
    /// - 所有工作表都被跳过时报 MissingNameColumn
    #[instrument(skip(self), fields(path = %file_path.display()))]
    pub fn import_file(&self, file_path: &Path) -> ImportResult<StartlistImport> {
        let sheets = self.parser.parse_sheets(file_path)?;
        let sheet_count = sheets.len();

        let mut result = StartlistImport::new();
        for sheet in sheets {
            let name = sheet.name.trim().to_string();
            let entries = self.map_sheet(&sheet);
            if entries.is_empty() {
                continue;
            }
            result.entry(name).or_default().extend(entries);
        }

        if result.is_empty() {
            return Err(ImportError::MissingNameColumn(file_path.display().to_string()));
        }

        info!(
            sheets = sheet_count,
            events = result.len(),
            competitors = result.values().map(Vec::len).sum::<usize>(),
            "出发名单解析完成"
        );
        Ok(result)
    }

    fn map_sheet(&self, sheet: &RawSheet) -> Vec<ImportedEntry> {
        let Some((header_idx, columns)) = self.mapper.locate_header(&sheet.rows) else {
            warn!(sheet = %sheet.name, "未找到姓名列，跳过工作表");
            return Vec::new();
        };

        sheet
            .rows
            .iter()
            .enumerate()
            .skip(header_idx + 1)
            .filter_map(|(idx, row)| self.mapper.map_row(&columns, row, idx + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticParser(Vec<RawSheet>);

    impl FileParser for StaticParser {
        fn parse_sheets(&self, _file_path: &Path) -> ImportResult<Vec<RawSheet>> {
            Ok(self.0.clone())
        }
    }

    fn sheet(name: &str, rows: &[&[&str]]) -> RawSheet {
        RawSheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_each_sheet_is_an_event() {
        let importer = StartlistImporter::with_parser(StaticParser(vec![
            sheet(
                "50m free",
                &[&["Name", "Seed", "Heat/Lane"], &["Fast", "30.00", "6/3"], &["Slow", "40.00", "5/1"]],
            ),
            sheet("100m back", &[&["Title"], &["ФИ", "Год"], &["Иванов", "2011"], &["", ""]]),
            sheet("notes", &[&["nothing here"]]),
        ]));

        let imported = importer.import_file(Path::new("meet.xlsx")).unwrap();

        assert_eq!(imported.len(), 2);
        let free = &imported["50m free"];
        assert_eq!(free.len(), 2);
        assert_eq!((free[0].heat, free[0].lane), (Some(6), Some(3)));
        assert_eq!(free[1].row_number, 3);

        let back = &imported["100m back"];
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].birth_year, Some(2011));
    }

    #[test]
    fn test_no_usable_sheet_is_error() {
        let importer = StartlistImporter::with_parser(StaticParser(vec![sheet("x", &[&["a", "b"]])]));
        let result = importer.import_file(Path::new("meet.xlsx"));
        assert!(matches!(result, Err(ImportError::MissingNameColumn(_))));
    }
}
