// ==========================================
// 游泳比赛编组系统 - 名次引擎
// ==========================================
// 职责: 根据比赛成绩与成绩标记计算名次
// 输入: 单个项目的全部参赛者
// 输出: 排序后的名单 + 参赛者ID → 名次
// ==========================================
// 红线: 只读 heat/lane，从不修改
// 红线: 名次只在 "有效标记 + 有成绩" 的参赛者之间递增
// ==========================================

use crate::domain::competitor::Competitor;
use crate::engine::sort_key::MissingLast;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

// ==========================================
// ExclusionPolicy - 名单排除策略
// ==========================================
// 项目成绩单只排除缺席者；总成绩单同时排除取消资格者
#[derive(Clone, Copy)]
pub enum ExclusionPolicy {
    /// 仅排除 ABSENT
    AbsentOnly,
    /// 排除 ABSENT 与 DQ
    AbsentOrDisqualified,
    /// 调用方自定义（返回 true 表示不列入名单）
    Custom(fn(&Competitor) -> bool),
}

impl ExclusionPolicy {
    /// 该参赛者是否被排除在名单之外
    pub fn excludes(&self, competitor: &Competitor) -> bool {
        match self {
            ExclusionPolicy::AbsentOnly => competitor.is_absent(),
            ExclusionPolicy::AbsentOrDisqualified => {
                competitor.is_absent() || competitor.result_mark.is_disqualified()
            }
            ExclusionPolicy::Custom(predicate) => predicate(competitor),
        }
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        ExclusionPolicy::AbsentOnly
    }
}

impl fmt::Debug for ExclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionPolicy::AbsentOnly => write!(f, "AbsentOnly"),
            ExclusionPolicy::AbsentOrDisqualified => write!(f, "AbsentOrDisqualified"),
            ExclusionPolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

// ==========================================
// Standings - 名次结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct StandingRow {
    pub place: Option<u32>, // None = 无名次（标记无效或无成绩）
    pub competitor: Competitor,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Standings {
    pub rows: Vec<StandingRow>,

    #[serde(skip)]
    places: HashMap<i64, u32>,
}

impl Standings {
    /// 查询名次（无名次或不在名单中返回 None）
    pub fn place_of(&self, competitor_id: i64) -> Option<u32> {
        self.places.get(&competitor_id).copied()
    }

    /// 已获得名次的人数
    pub fn placed_count(&self) -> usize {
        self.places.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.rows.iter().map(|row| &row.competitor)
    }
}

// ==========================================
// RankingEngine - 名次引擎
// ==========================================
pub struct RankingEngine {
    // 无状态引擎,不需要注入依赖
}

impl RankingEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算名次
    ///
    /// 规则:
    /// 1) 被排除策略命中的参赛者不列入名单
    /// 2) 其余按成绩升序（无成绩沉底）→ 姓名升序
    /// 3) 名次 1.. 只分配给 "标记有效 且 有成绩" 者；
    ///    其余人保留在名单中原位置，但不占名次
    ///
    /// 成绩相同者按姓名先后依次得到相邻名次，不并列
    pub fn rank_active(&self, competitors: &[Competitor], exclusion: ExclusionPolicy) -> Standings {
        let mut listed: Vec<&Competitor> = competitors
            .iter()
            .filter(|c| !exclusion.excludes(c))
            .collect();

        listed.sort_by(|a, b| compare_by_result(a, b));

        let mut places = HashMap::new();
        let mut rows = Vec::with_capacity(listed.len());
        let mut next_place = 1u32;

        for competitor in listed {
            let place = if is_placeable(competitor) {
                let place = next_place;
                next_place += 1;
                places.insert(competitor.id, place);
                Some(place)
            } else {
                None
            };

            rows.push(StandingRow {
                place,
                competitor: competitor.clone(),
            });
        }

        debug!(
            listed = rows.len(),
            placed = places.len(),
            policy = ?exclusion,
            "名次计算完成"
        );

        Standings { rows, places }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_placeable(competitor: &Competitor) -> bool {
    competitor.result_mark.is_valid() && competitor.result_time.is_some()
}

/// 成绩 → 姓名
fn compare_by_result(a: &Competitor, b: &Competitor) -> Ordering {
    MissingLast(a.result_time)
        .cmp(&MissingLast(b.result_time))
        .then_with(|| a.name.cmp(&b.name))
}
