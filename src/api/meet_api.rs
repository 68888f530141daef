// ==========================================
// 游泳比赛编组系统 - 赛事管理 API
// ==========================================
// 职责: 名单导入、缺席/恢复、重新编组、成绩录入、成绩单
// 约束: 每个写操作都记录 ActionLog
// ==========================================

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::competitor::{Competitor, Event, ImportedEntry, LaneCount, ResultEntry, ResultUpdate};
use crate::domain::time_codec::parse_time_to_cs;
use crate::domain::types::{ReseedMode, ResultMark};
use crate::engine::{ExclusionPolicy, RankingEngine, SeedingEngine, Standings};
use crate::importer::StartlistImporter;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::roster_repo::RosterStore;

// ==========================================
// 响应类型
// ==========================================

/// 导入结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub events: usize,
    pub competitors: usize,
    pub lane_count: u32,
}

/// 单个项目的成绩单
#[derive(Debug, Clone, Serialize)]
pub struct EventStandings {
    pub event: Event,
    pub standings: Standings,
}

// ==========================================
// MeetApi - 赛事管理 API
// ==========================================

/// 赛事管理API
///
/// 职责：
/// 1. 出发名单导入（清空后重建；保留文件中的组次，或按报名成绩整体编组）
/// 2. 缺席/恢复与重新编组
/// 3. 成绩录入与成绩单
/// 4. ActionLog记录
pub struct MeetApi {
    roster: Arc<dyn RosterStore>,
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
    importer: StartlistImporter,
    seeding: SeedingEngine,
    ranking: RankingEngine,
}

impl MeetApi {
    /// 创建新的MeetApi实例
    pub fn new(
        roster: Arc<dyn RosterStore>,
        config_manager: Arc<ConfigManager>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            roster,
            config_manager,
            action_log_repo,
            importer: StartlistImporter::new(),
            seeding: SeedingEngine::new(),
            ranking: RankingEngine::new(),
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 列出全部项目
    pub fn list_events(&self) -> ApiResult<Vec<Event>> {
        Ok(self.roster.list_events()?)
    }

    /// 出发名单（组次 → 道次 → 姓名，未编组者沉底）
    ///
    /// # 参数
    /// - event_id: 项目ID
    /// - search: 姓名模糊匹配（可选）
    pub fn start_list(&self, event_id: i64, search: Option<&str>) -> ApiResult<Vec<Competitor>> {
        self.require_event(event_id)?;
        Ok(self.roster.list_competitors(event_id, search)?)
    }

    /// 项目成绩单（只排除缺席者）
    pub fn event_standings(&self, event_id: i64) -> ApiResult<Standings> {
        self.require_event(event_id)?;
        let roster = self.roster.list_competitors(event_id, None)?;
        Ok(self.ranking.rank_active(&roster, ExclusionPolicy::AbsentOnly))
    }

    /// 总成绩单（每个项目排除缺席与取消资格者，项目按 id 顺序）
    pub fn final_standings(&self) -> ApiResult<Vec<EventStandings>> {
        let mut result = Vec::new();
        for event in self.roster.list_events()? {
            let roster = self.roster.list_competitors(event.id, None)?;
            let standings = self
                .ranking
                .rank_active(&roster, ExclusionPolicy::AbsentOrDisqualified);
            result.push(EventStandings { event, standings });
        }
        Ok(result)
    }

    /// 最近的操作日志
    pub fn recent_actions(&self, limit: u32) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_recent(limit)?)
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入出发名单
    ///
    /// 先解析文件（失败时不动现有名单），再清空名单、按默认道数建项目。
    /// 文件给出了组次/道次的项目保留原组次，只在组内压缩道次；
    /// 没有组次/道次的项目按报名成绩整体编组
    #[instrument(skip(self), fields(path = %file_path.display()))]
    pub fn import_startlist(&self, file_path: &Path) -> ApiResult<ImportSummary> {
        let imported = self.importer.import_file(file_path)?;
        let lane_count = self.config_manager.get_default_lane_count()?;

        self.roster.clear_all()?;
        self.action_log_repo.insert(
            &ActionLog::new(ActionType::ClearRoster, None).with_detail("导入前清空名单"),
        )?;

        let mut competitors = 0;
        for (event_name, entries) in &imported {
            let event_id = self.roster.upsert_event(event_name, lane_count)?;
            let rows: Vec<Competitor> = entries
                .iter()
                .map(|entry| competitor_from_import(event_id, entry))
                .collect();
            competitors += self.roster.insert_competitors(event_id, &rows)?.len();

            let event = self.require_event(event_id)?;
            self.reseed_in_place(&event, import_reseed_mode(entries))?;
        }

        let summary = ImportSummary {
            events: imported.len(),
            competitors,
            lane_count: lane_count.get(),
        };

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::ImportStartlist, None)
                .with_payload(json!({
                    "path": file_path.display().to_string(),
                    "events": summary.events,
                    "competitors": summary.competitors,
                }))
                .with_detail(format!("导入出发名单: {}", file_path.display())),
        )?;

        info!(events = summary.events, competitors, "出发名单导入完成");
        Ok(summary)
    }

    // ==========================================
    // 缺席 / 恢复 / 重新编组
    // ==========================================

    /// 标记缺席
    ///
    /// 只改状态并清空组次/道次，不自动重新编组（其余人道次保持不变）
    pub fn mark_absent(&self, event_id: i64, competitor_ids: &[i64]) -> ApiResult<usize> {
        self.require_event(event_id)?;
        if competitor_ids.is_empty() {
            return Ok(0);
        }

        let count = self.roster.mark_absent(event_id, competitor_ids)?;

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::MarkAbsent, Some(event_id))
                .with_payload(json!({ "competitor_ids": competitor_ids }))
                .with_detail(format!("标记缺席: {} 人", count)),
        )?;

        Ok(count)
    }

    /// 恢复参赛并重新编组
    ///
    /// # 参数
    /// - mode: 重排模式，None 时使用配置的默认模式
    pub fn restore(
        &self,
        event_id: i64,
        competitor_ids: &[i64],
        mode: Option<ReseedMode>,
    ) -> ApiResult<Vec<Competitor>> {
        let event = self.require_event(event_id)?;
        let mode = self.resolve_mode(mode)?;

        let count = self.roster.restore(event_id, competitor_ids)?;
        let updated = self.reseed_in_place(&event, mode)?;

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::Restore, Some(event_id))
                .with_payload(json!({
                    "competitor_ids": competitor_ids,
                    "mode": mode.to_db_str(),
                }))
                .with_detail(format!("恢复参赛: {} 人, 模式 {}", count, mode)),
        )?;

        Ok(updated)
    }

    /// 重新编组
    ///
    /// # 返回
    /// - 编组引擎输出的参赛者列表（软重排按组次/道次/姓名排序；
    ///   整体重排为报名成绩顺序，缺席者在末尾）
    pub fn reseed_event(&self, event_id: i64, mode: Option<ReseedMode>) -> ApiResult<Vec<Competitor>> {
        let event = self.require_event(event_id)?;
        let mode = self.resolve_mode(mode)?;

        let updated = self.reseed_in_place(&event, mode)?;

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::Reseed, Some(event_id))
                .with_payload(json!({ "mode": mode.to_db_str(), "lane_count": event.lane_count.get() }))
                .with_detail(format!("重新编组: {}", event.name)),
        )?;

        Ok(updated)
    }

    /// 修改项目道数（不自动重排）
    pub fn set_lane_count(&self, event_id: i64, lanes: u32) -> ApiResult<Event> {
        let lane_count = LaneCount::new(lanes)
            .ok_or_else(|| ApiError::InvalidInput(format!("道数必须为正整数: {}", lanes)))?;
        self.require_event(event_id)?;

        self.roster.set_lane_count(event_id, lane_count)?;

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::UpdateConfig, Some(event_id))
                .with_payload(json!({ "lane_count": lanes }))
                .with_detail(format!("修改道数: {}", lanes)),
        )?;

        self.require_event(event_id)
    }

    // ==========================================
    // 成绩
    // ==========================================

    /// 录入成绩
    ///
    /// - 成绩文本为空: 清空成绩
    /// - 成绩文本无法解析: 保留原文，成绩视为缺失（不占名次）
    /// - 标记为空视为 OK；未知标记报 InvalidInput
    /// - 参赛者不属于该项目报 NotFound
    pub fn save_results(&self, event_id: i64, entries: &[ResultEntry]) -> ApiResult<usize> {
        self.require_event(event_id)?;

        let known: HashSet<i64> = self
            .roster
            .list_competitors(event_id, None)?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut updates = Vec::with_capacity(entries.len());
        for entry in entries {
            if !known.contains(&entry.competitor_id) {
                return Err(ApiError::NotFound(format!(
                    "参赛者(id={})不属于项目(id={})",
                    entry.competitor_id, event_id
                )));
            }
            updates.push(parse_result_entry(entry)?);
        }

        let unparsed = updates
            .iter()
            .filter(|u| u.result_time_raw.is_some() && u.result_time.is_none())
            .count();
        if unparsed > 0 {
            warn!(event_id, unparsed, "部分成绩无法解析，按无成绩处理");
        }

        let count = self.roster.set_results(&updates)?;

        self.action_log_repo.insert(
            &ActionLog::new(ActionType::SaveResults, Some(event_id))
                .with_payload(json!({ "entries": entries }))
                .with_detail(format!("录入成绩: {} 条", count)),
        )?;

        Ok(count)
    }

    // ==========================================
    // 内部方法
    // ==========================================

    fn require_event(&self, event_id: i64) -> ApiResult<Event> {
        self.roster
            .find_event(event_id)?
            .ok_or_else(|| ApiError::NotFound(format!("项目(id={})不存在", event_id)))
    }

    fn resolve_mode(&self, mode: Option<ReseedMode>) -> ApiResult<ReseedMode> {
        match mode {
            Some(mode) => Ok(mode),
            None => Ok(self.config_manager.get_default_reseed_mode()?),
        }
    }

    fn reseed_in_place(&self, event: &Event, mode: ReseedMode) -> ApiResult<Vec<Competitor>> {
        let roster = self.roster.list_competitors(event.id, None)?;
        let updated = match mode {
            ReseedMode::Soft => self.seeding.compress_lanes_within_heats(roster),
            ReseedMode::Full => self.seeding.full_reseed(roster, event.lane_count),
        };
        self.roster.update_positions(&updated)?;
        Ok(updated)
    }
}

/// 导入后的编组方式：文件带组次/道次时保留，否则整体重排
fn import_reseed_mode(entries: &[ImportedEntry]) -> ReseedMode {
    if entries.iter().any(|entry| entry.heat.is_some()) {
        ReseedMode::Soft
    } else {
        ReseedMode::Full
    }
}

fn competitor_from_import(event_id: i64, entry: &ImportedEntry) -> Competitor {
    let mut competitor = Competitor::new(0, event_id, entry.name.clone())
        .with_seed_time(entry.seed_time_raw.as_deref().and_then(parse_time_to_cs))
        .with_position(entry.heat, entry.lane);
    competitor.birth_year = entry.birth_year;
    competitor.team = entry.team.clone();
    competitor.seed_time_raw = entry.seed_time_raw.clone();
    competitor
}

fn parse_result_entry(entry: &ResultEntry) -> ApiResult<ResultUpdate> {
    let result_mark = ResultMark::from_str(&entry.result_mark).ok_or_else(|| {
        ApiError::InvalidInput(format!(
            "未知成绩标记: '{}' (competitor_id={})",
            entry.result_mark, entry.competitor_id
        ))
    })?;

    let raw = entry.result_time_raw.trim();
    let (result_time_raw, result_time) = if raw.is_empty() {
        (None, None)
    } else {
        (Some(raw.to_string()), parse_time_to_cs(raw))
    };

    Ok(ResultUpdate {
        competitor_id: entry.competitor_id,
        result_time_raw,
        result_time,
        result_mark,
    })
}
