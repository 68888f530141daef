// ==========================================
// 游泳比赛编组系统 - 核心库
// ==========================================
// 职责: 出发名单导入、组次/道次编排、成绩名次计算
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 编组与名次
pub mod engine;

// 导入层 - 出发名单
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// 命令行
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntryStatus, ReseedMode, ResultMark};

// 领域实体
pub use domain::{
    format_time_cs, parse_time_to_cs, ActionLog, ActionType, Centiseconds, Competitor, Event,
    ImportedEntry, LaneCount, ResultEntry, StartlistImport,
};

// 引擎
pub use engine::{ExclusionPolicy, RankingEngine, SeedingEngine, StandingRow, Standings};

// API
pub use api::{ApiError, ApiResult, MeetApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "游泳比赛编组系统";
