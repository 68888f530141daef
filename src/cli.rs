// ==========================================
// 游泳比赛编组系统 - 命令行
// ==========================================
// 职责: 解析命令行参数并调用 MeetApi，结果以 JSON 输出到 stdout
// ==========================================

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use crate::app::{get_default_db_path, AppState};
use crate::domain::competitor::{LaneCount, ResultEntry};
use crate::domain::types::ReseedMode;
use crate::i18n;

/// 游泳比赛编组与成绩命令行
#[derive(Debug, Parser)]
#[command(name = "swim-meet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 数据库文件（默认: SWIM_MEET_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// 日志以 JSON 行输出到 stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// 导入出发名单（.xlsx/.csv），清空现有名单并按报名成绩编组
    Import {
        path: PathBuf,
        /// 导入前不备份数据库
        #[arg(long)]
        no_backup: bool,
    },
    /// 列出项目
    Events,
    /// 出发名单
    StartList {
        event_id: i64,
        /// 姓名模糊匹配
        #[arg(long)]
        search: Option<String>,
    },
    /// 标记缺席（不自动重新编组）
    Absent {
        event_id: i64,
        #[arg(required = true)]
        competitor_ids: Vec<i64>,
    },
    /// 恢复参赛并重新编组
    Restore {
        event_id: i64,
        #[arg(required = true)]
        competitor_ids: Vec<i64>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// 重新编组
    Reseed {
        event_id: i64,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// 修改项目道数
    Lanes { event_id: i64, lane_count: u32 },
    /// 录入成绩（JSON 文件: [{"competitor_id":1,"result_time_raw":"00:59:10","result_mark":""}]）
    Results { event_id: i64, file: PathBuf },
    /// 项目成绩单
    Standings { event_id: i64 },
    /// 总成绩单
    Final,
    /// 最近的操作日志
    Log {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// 备份数据库
    Backup {
        #[arg(long, default_value = "manual")]
        reason: String,
    },
    /// 查看或修改默认配置
    Config {
        /// 新建项目的默认道数
        #[arg(long)]
        lanes: Option<u32>,
        /// 默认重排模式
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// 界面语言（zh-CN / en / ru）
        #[arg(long)]
        locale: Option<String>,
    },
}

/// 重排模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// 保持组次，组内压缩道次
    Soft,
    /// 按报名成绩重新编组
    Full,
}

impl From<ModeArg> for ReseedMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Soft => ReseedMode::Soft,
            ModeArg::Full => ReseedMode::Full,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(get_default_db_path);
    tracing::info!(db = %db_path, "使用数据库");

    let state = AppState::new(db_path).context("无法初始化数据库")?;
    let api = &state.meet_api;

    match cli.command {
        Commands::Import { path, no_backup } => {
            if !no_backup {
                state.create_backup("import")?;
            }
            let summary = api.import_startlist(&path)?;
            tracing::info!(
                "{}",
                i18n::t_with_args(
                    "import.done",
                    &[
                        ("events", &summary.events.to_string()),
                        ("competitors", &summary.competitors.to_string()),
                    ],
                )
            );
            print_json(&summary)
        }
        Commands::Events => print_json(&api.list_events()?),
        Commands::StartList { event_id, search } => {
            print_json(&api.start_list(event_id, search.as_deref())?)
        }
        Commands::Absent {
            event_id,
            competitor_ids,
        } => {
            let count = api.mark_absent(event_id, &competitor_ids)?;
            print_json(&json!({ "marked_absent": count }))
        }
        Commands::Restore {
            event_id,
            competitor_ids,
            mode,
        } => print_json(&api.restore(event_id, &competitor_ids, mode.map(Into::into))?),
        Commands::Reseed { event_id, mode } => {
            let mode = match mode {
                Some(mode) => mode.into(),
                None => state.config_manager.get_default_reseed_mode()?,
            };
            tracing::info!(event_id, "{}", i18n::reseed_mode_label(mode));
            print_json(&api.reseed_event(event_id, Some(mode))?)
        }
        Commands::Lanes {
            event_id,
            lane_count,
        } => print_json(&api.set_lane_count(event_id, lane_count)?),
        Commands::Results { event_id, file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("无法读取成绩文件: {}", file.display()))?;
            let entries: Vec<ResultEntry> =
                serde_json::from_str(&text).context("成绩文件不是有效的 JSON")?;
            let count = api.save_results(event_id, &entries)?;
            print_json(&json!({ "saved": count }))
        }
        Commands::Standings { event_id } => print_json(&api.event_standings(event_id)?),
        Commands::Final => print_json(&api.final_standings()?),
        Commands::Log { limit } => print_json(&api.recent_actions(limit)?),
        Commands::Backup { reason } => {
            let path = state.create_backup(&reason)?;
            print_json(&json!({ "backup": path.display().to_string() }))
        }
        Commands::Config {
            lanes,
            mode,
            locale,
        } => {
            let config = &state.config_manager;
            if let Some(lanes) = lanes {
                let lanes = LaneCount::new(lanes).context("道数必须为正整数")?;
                config.set_default_lane_count(lanes)?;
            }
            if let Some(mode) = mode {
                config.set_default_reseed_mode(mode.into())?;
            }
            if let Some(locale) = locale {
                anyhow::ensure!(i18n::is_supported(&locale), "不支持的语言: {}", locale);
                config.set_locale(&locale)?;
            }
            let snapshot: serde_json::Value = serde_json::from_str(&config.get_config_snapshot()?)?;
            print_json(&snapshot)
        }
    }
}
