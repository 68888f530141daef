// ==========================================
// 游泳比赛编组系统 - 参赛者与项目模型
// ==========================================
// 红线: ABSENT 的参赛者 heat/lane 必须为空
// 红线: heat/lane 只由编组引擎写入，名次引擎只读
// ==========================================

use crate::domain::time_codec::Centiseconds;
use crate::domain::types::{EntryStatus, ResultMark};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// 每组默认道数
pub const DEFAULT_LANE_COUNT: u32 = 8;

// ==========================================
// Competitor - 参赛者（一个项目的一条报名）
// ==========================================
// 对齐: competitor 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    // ===== 主键 =====
    pub id: i64,       // 全局唯一
    pub event_id: i64, // 所属项目

    // ===== 基础信息 =====
    pub name: String,               // 姓名（排序兜底键，区分大小写）
    pub birth_year: Option<i32>,    // 出生年份
    pub team: Option<String>,       // 代表队

    // ===== 报名成绩 =====
    pub seed_time_raw: Option<String>,     // 原始文本
    pub seed_time: Option<Centiseconds>,   // 厘秒，None = 无报名成绩

    // ===== 比赛成绩 =====
    pub result_time_raw: Option<String>,
    pub result_time: Option<Centiseconds>, // 厘秒，None = 未录入
    pub result_mark: ResultMark,

    // ===== 编组 =====
    pub status: EntryStatus,
    pub heat: Option<u32>, // 组次，从 1 开始
    pub lane: Option<u32>, // 道次，从 1 开始
}

impl Competitor {
    /// 创建一条在册、未编组的参赛记录
    pub fn new(id: i64, event_id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            event_id,
            name: name.into(),
            birth_year: None,
            team: None,
            seed_time_raw: None,
            seed_time: None,
            result_time_raw: None,
            result_time: None,
            result_mark: ResultMark::Ok,
            status: EntryStatus::Active,
            heat: None,
            lane: None,
        }
    }

    pub fn with_seed_time(mut self, seed_time: Option<Centiseconds>) -> Self {
        self.seed_time = seed_time;
        self
    }

    pub fn with_position(mut self, heat: Option<u32>, lane: Option<u32>) -> Self {
        self.heat = heat;
        self.lane = lane;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_result(mut self, result_time: Option<Centiseconds>, result_mark: ResultMark) -> Self {
        self.result_time = result_time;
        self.result_mark = result_mark;
        self
    }

    pub fn is_absent(&self) -> bool {
        self.status.is_absent()
    }

    /// 清空组次/道次（标记缺席时使用）
    pub(crate) fn clear_position(&mut self) {
        self.heat = None;
        self.lane = None;
    }
}

// ==========================================
// LaneCount - 每组道数
// ==========================================
// 构造时校验为正数，整体重排不会出现除零
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LaneCount(NonZeroU32);

impl LaneCount {
    /// 校验并创建道数（0 返回 None）
    pub fn new(lanes: u32) -> Option<Self> {
        NonZeroU32::new(lanes).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl Default for LaneCount {
    fn default() -> Self {
        Self(NonZeroU32::new(DEFAULT_LANE_COUNT).unwrap_or(NonZeroU32::MIN))
    }
}

impl TryFrom<u32> for LaneCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        LaneCount::new(value).ok_or_else(|| "道数必须为正整数".to_string())
    }
}

impl From<LaneCount> for u32 {
    fn from(value: LaneCount) -> Self {
        value.get()
    }
}

// ==========================================
// Event - 比赛项目（距离/泳姿）
// ==========================================
// 对齐: event 表；name 全局唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub lane_count: LaneCount,
}

// ==========================================
// ImportedEntry - 导入中间记录
// ==========================================
// 由导入器生成，引擎与仓储从不接触未类型化的行数据
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportedEntry {
    pub name: String,
    pub birth_year: Option<i32>,
    pub team: Option<String>,
    pub seed_time_raw: Option<String>,
    pub heat: Option<u32>,
    pub lane: Option<u32>,

    // 元信息（源文件行号，1 起）
    pub row_number: usize,
}

/// 导入结果：项目名 → 报名列表（按项目名排序，保证处理顺序确定）
pub type StartlistImport = BTreeMap<String, Vec<ImportedEntry>>;

// ==========================================
// ResultEntry - 成绩录入
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub competitor_id: i64,
    pub result_time_raw: String, // 原始文本，空 = 未录入
    pub result_mark: String,     // 原始标记，空 = OK
}

/// 解析后的成绩字段（写入仓储用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultUpdate {
    pub competitor_id: i64,
    pub result_time_raw: Option<String>,
    pub result_time: Option<Centiseconds>,
    pub result_mark: ResultMark,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_count_rejects_zero() {
        assert!(LaneCount::new(0).is_none());
        assert_eq!(LaneCount::new(6).map(|l| l.get()), Some(6));
        assert_eq!(LaneCount::default().get(), DEFAULT_LANE_COUNT);
    }

    #[test]
    fn test_lane_count_serde() {
        let lanes: LaneCount = serde_json::from_str("10").unwrap();
        assert_eq!(lanes.get(), 10);
        assert!(serde_json::from_str::<LaneCount>("0").is_err());
        assert_eq!(serde_json::to_string(&lanes).unwrap(), "10");
    }

    #[test]
    fn test_new_competitor_is_active_and_unassigned() {
        let c = Competitor::new(1, 2, "Ivanova");
        assert_eq!(c.status, EntryStatus::Active);
        assert_eq!(c.result_mark, ResultMark::Ok);
        assert!(c.heat.is_none() && c.lane.is_none());
    }
}
