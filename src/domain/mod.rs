// ==========================================
// 游泳比赛编组系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、时间编解码
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod competitor;
pub mod time_codec;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use competitor::{
    Competitor, Event, ImportedEntry, LaneCount, ResultEntry, ResultUpdate, StartlistImport,
    DEFAULT_LANE_COUNT,
};
pub use time_codec::{format_time_cs, parse_time_to_cs, Centiseconds};
pub use types::{EntryStatus, ReseedMode, ResultMark};
