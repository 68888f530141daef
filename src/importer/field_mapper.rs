// ==========================================
// 游泳比赛编组系统 - 字段映射器实现
// ==========================================
// 职责: 表头探测 + 源列 → 标准字段映射 + 类型转换
// 表头别名: 俄文 / 英文 / 中文（不区分大小写，整格匹配）
// ==========================================

use crate::domain::competitor::ImportedEntry;

/// 在前 N 行内探测表头
pub const HEADER_SCAN_ROWS: usize = 10;

// ==========================================
// ColumnKind - 标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Name,
    BirthYear,
    Team,
    SeedTime,
    HeatLane, // "组次/道次" 合并列，如 "2/5"
}

const HEADER_ALIASES: &[(ColumnKind, &[&str])] = &[
    (
        ColumnKind::Name,
        &["фи", "ф. и.", "фио", "участник", "name", "swimmer", "姓名", "运动员"],
    ),
    (
        ColumnKind::BirthYear,
        &["год рождения", "год", "birth", "year", "birth year", "出生年份", "年份"],
    ),
    (ColumnKind::Team, &["команда", "team", "club", "代表队", "队伍", "单位"]),
    (
        ColumnKind::SeedTime,
        &["заявочное время", "время", "seed", "entry time", "seed time", "报名成绩"],
    ),
    (
        ColumnKind::HeatLane,
        &["заплыв/дорожка", "заплыв", "heat/lane", "组次/道次", "组/道"],
    ),
];

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn classify(header: &str) -> Option<ColumnKind> {
    let h = normalize(header);
    HEADER_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&h.as_str()))
        .map(|(kind, _)| *kind)
}

// ==========================================
// ColumnMap - 列位置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub birth_year: Option<usize>,
    pub team: Option<usize>,
    pub seed_time: Option<usize>,
    pub heat_lane: Option<usize>,
}

impl ColumnMap {
    /// 由表头行建立列映射（同类列取第一个）
    pub fn from_header(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (idx, cell) in header.iter().enumerate() {
            let slot = match classify(cell) {
                Some(ColumnKind::Name) => &mut map.name,
                Some(ColumnKind::BirthYear) => &mut map.birth_year,
                Some(ColumnKind::Team) => &mut map.team,
                Some(ColumnKind::SeedTime) => &mut map.seed_time,
                Some(ColumnKind::HeatLane) => &mut map.heat_lane,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }
}

// ==========================================
// FieldMapper
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    /// 探测表头所在行
    ///
    /// 前 10 行中第一个含姓名列的行即为表头；找不到返回 None
    pub fn locate_header(&self, rows: &[Vec<String>]) -> Option<(usize, ColumnMap)> {
        rows.iter()
            .take(HEADER_SCAN_ROWS)
            .enumerate()
            .map(|(idx, row)| (idx, ColumnMap::from_header(row)))
            .find(|(_, map)| map.has_name())
    }

    /// 映射单行数据；姓名为空的行返回 None
    ///
    /// row_number 为表格中的 1 基行号（便于定位源数据）
    pub fn map_row(&self, columns: &ColumnMap, row: &[String], row_number: usize) -> Option<ImportedEntry> {
        let name = cell(row, columns.name)?;

        let (heat, lane) = cell(row, columns.heat_lane)
            .map(parse_heat_lane)
            .unwrap_or((None, None));

        Some(ImportedEntry {
            name: name.to_string(),
            birth_year: cell(row, columns.birth_year).and_then(parse_birth_year),
            team: cell(row, columns.team).map(str::to_string),
            seed_time_raw: cell(row, columns.seed_time).map(str::to_string),
            heat,
            lane,
            row_number,
        })
    }
}

/// 取非空单元格
fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// "H/L" → (组次, 道次)；任一部分不是纯数字则两者都为空
pub fn parse_heat_lane(text: &str) -> (Option<u32>, Option<u32>) {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let Some((heat, lane)) = compact.split_once('/') else {
        return (None, None);
    };

    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(heat) || !is_digits(lane) {
        return (None, None);
    }

    match (heat.parse::<u32>(), lane.parse::<u32>()) {
        (Ok(h), Ok(l)) => (Some(h), Some(l)),
        _ => (None, None),
    }
}

/// 出生年份：接受整数或整数值的浮点（Excel 数字单元格常为 "2010" 或 "2010.0"）
pub fn parse_birth_year(text: &str) -> Option<i32> {
    if let Ok(year) = text.parse::<i32>() {
        return Some(year);
    }
    let value = text.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}
