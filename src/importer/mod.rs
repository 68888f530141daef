// ==========================================
// 游泳比赛编组系统 - 导入层
// ==========================================
// 职责: 外部出发名单导入,生成类型化的参赛者记录
// 支持: Excel (.xlsx), CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod startlist_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnMap, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawSheet, UniversalFileParser};
pub use startlist_importer::StartlistImporter;
