// ==========================================
// 游泳比赛编组系统 - 引擎层
// ==========================================
// 职责: 编组(组次/道次)与名次计算,不拼 SQL
// 红线: 引擎无状态,每次调用都是输入的纯函数
// ==========================================

pub mod ranking;
pub mod seeding;
pub mod sort_key;

// 重导出核心引擎
pub use ranking::{ExclusionPolicy, RankingEngine, StandingRow, Standings};
pub use seeding::{SeedingEngine, UNASSIGNED_HEAT_GROUP};
pub use sort_key::MissingLast;
