// ==========================================
// 游泳比赛编组系统 - 编组引擎
// ==========================================
// 职责: 根据参赛状态与报名成绩分配/重排组次与道次
// 输入: 单个项目的全部参赛者（任意顺序）
// 输出: 新的参赛者列表（调用方负责落库）
// ==========================================
// 红线: 引擎无状态、不落库、不失败
// 红线: 每组道次必须是从 1 开始的连续序列
// ==========================================

use crate::domain::competitor::{Competitor, LaneCount};
use crate::engine::sort_key::MissingLast;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// 组次缺失的在册参赛者在软重排中并入第 1 组
///
/// 沿用原有行为：未编组的人不会保持未编组，而是排到第 1 组末尾。
/// 是否应改为单独处理需与赛事组织方确认。
pub const UNASSIGNED_HEAT_GROUP: u32 = 1;

// ==========================================
// SeedingEngine - 编组引擎
// ==========================================
pub struct SeedingEngine {
    // 无状态引擎,不需要注入依赖
}

impl SeedingEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 软重排: 组内压缩道次
    // ==========================================

    /// 组内压缩道次（软重排）
    ///
    /// 规则:
    /// 1) ABSENT: 清空组次/道次
    /// 2) ACTIVE: 按当前组次分组（组次为空并入第 1 组）
    /// 3) 组内排序: 当前道次升序 → 报名成绩升序 → 姓名升序（缺失值沉底）
    /// 4) 组内依次分配道次 1..N，组次不变
    /// 5) 全部结果按 (组次, 道次, 姓名) 排序输出，缺失值沉底
    ///
    /// 用途: 个别运动员缺席/恢复后，只移动所在组的道次，其他组不动
    pub fn compress_lanes_within_heats(&self, competitors: Vec<Competitor>) -> Vec<Competitor> {
        let total = competitors.len();
        let mut result = Vec::with_capacity(total);
        let mut grouped: BTreeMap<u32, Vec<Competitor>> = BTreeMap::new();

        for mut competitor in competitors {
            if competitor.is_absent() {
                competitor.clear_position();
                result.push(competitor);
            } else {
                grouped
                    .entry(grouping_heat(&competitor))
                    .or_default()
                    .push(competitor);
            }
        }

        let heat_count = grouped.len();
        for (heat, mut group) in grouped {
            group.sort_by(compare_within_heat);
            for (idx, mut competitor) in group.into_iter().enumerate() {
                competitor.heat = Some(heat);
                competitor.lane = Some(idx as u32 + 1);
                result.push(competitor);
            }
        }

        result.sort_by(compare_presentation);

        debug!(total, heat_count, "组内压缩道次完成");
        result
    }

    // ==========================================
    // 整体重排: 按报名成绩重建组次与道次
    // ==========================================

    /// 整体重排
    ///
    /// 规则:
    /// 1) ABSENT: 清空组次/道次
    /// 2) ACTIVE: 报名成绩升序（无成绩者排在所有有成绩者之后）→ 姓名升序
    /// 3) 第 r 名（0 起）: heat = r / lane_count + 1, lane = r % lane_count + 1
    ///
    /// 输出顺序: 在册者（按名次）在前，缺席者在后，不再整体按组次重排
    pub fn full_reseed(&self, competitors: Vec<Competitor>, lane_count: LaneCount) -> Vec<Competitor> {
        let lanes = lane_count.get() as usize;
        let mut active = Vec::with_capacity(competitors.len());
        let mut absent = Vec::new();

        for mut competitor in competitors {
            if competitor.is_absent() {
                competitor.clear_position();
                absent.push(competitor);
            } else {
                active.push(competitor);
            }
        }

        active.sort_by(compare_by_seed);

        for (rank, competitor) in active.iter_mut().enumerate() {
            competitor.heat = Some((rank / lanes) as u32 + 1);
            competitor.lane = Some((rank % lanes) as u32 + 1);
        }

        debug!(
            active = active.len(),
            absent = absent.len(),
            lanes,
            "整体重排完成"
        );

        active.extend(absent);
        active
    }
}

impl Default for SeedingEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 比较方法
// ==========================================

fn grouping_heat(competitor: &Competitor) -> u32 {
    competitor.heat.unwrap_or(UNASSIGNED_HEAT_GROUP)
}

/// 组内排序: 当前道次 → 报名成绩 → 姓名
fn compare_within_heat(a: &Competitor, b: &Competitor) -> Ordering {
    MissingLast(a.lane)
        .cmp(&MissingLast(b.lane))
        .then_with(|| MissingLast(a.seed_time).cmp(&MissingLast(b.seed_time)))
        .then_with(|| a.name.cmp(&b.name))
}

/// 展示排序: 组次 → 道次 → 姓名
pub(crate) fn compare_presentation(a: &Competitor, b: &Competitor) -> Ordering {
    MissingLast(a.heat)
        .cmp(&MissingLast(b.heat))
        .then_with(|| MissingLast(a.lane).cmp(&MissingLast(b.lane)))
        .then_with(|| a.name.cmp(&b.name))
}

/// 整体重排排序: 报名成绩 → 姓名
fn compare_by_seed(a: &Competitor, b: &Competitor) -> Ordering {
    MissingLast(a.seed_time)
        .cmp(&MissingLast(b.seed_time))
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests;
