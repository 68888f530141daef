use super::SeedingEngine;
use crate::domain::competitor::{Competitor, LaneCount};
use crate::domain::types::EntryStatus;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// 测试辅助函数
// ==========================================

fn make_competitor(
    id: i64,
    heat: Option<u32>,
    lane: Option<u32>,
    status: EntryStatus,
    seed: Option<i64>,
) -> Competitor {
    Competitor::new(id, 1, format!("S{}", id))
        .with_position(heat, lane)
        .with_status(status)
        .with_seed_time(seed)
}

fn active(id: i64, heat: u32, lane: u32) -> Competitor {
    make_competitor(id, Some(heat), Some(lane), EntryStatus::Active, None)
}

fn lanes(n: u32) -> LaneCount {
    LaneCount::new(n).unwrap()
}

fn position_of(out: &[Competitor], id: i64) -> (Option<u32>, Option<u32>) {
    let c = out.iter().find(|c| c.id == id).unwrap();
    (c.heat, c.lane)
}

/// 检查每组道次是否为 {1..k}
fn assert_lanes_contiguous(out: &[Competitor]) {
    let mut by_heat: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for c in out.iter().filter(|c| !c.is_absent()) {
        by_heat
            .entry(c.heat.expect("在册者必须有组次"))
            .or_default()
            .push(c.lane.expect("在册者必须有道次"));
    }
    for (heat, mut lanes) in by_heat {
        lanes.sort_unstable();
        let expected: Vec<u32> = (1..=lanes.len() as u32).collect();
        assert_eq!(lanes, expected, "第 {} 组道次不连续", heat);
    }
}

fn assert_absent_cleared(out: &[Competitor]) {
    for c in out.iter().filter(|c| c.is_absent()) {
        assert!(c.heat.is_none() && c.lane.is_none(), "缺席者 {} 仍有组次/道次", c.id);
    }
}

// ==========================================
// 软重排
// ==========================================

#[test]
fn test_soft_compress_keeps_heats() {
    let engine = SeedingEngine::new();
    let roster = vec![
        active(1, 1, 1),
        make_competitor(2, Some(1), Some(2), EntryStatus::Absent, None),
        active(3, 1, 3),
        active(4, 2, 2),
    ];

    let out = engine.compress_lanes_within_heats(roster);

    assert_eq!(position_of(&out, 1), (Some(1), Some(1)));
    assert_eq!(position_of(&out, 3), (Some(1), Some(2)));
    assert_eq!(position_of(&out, 4), (Some(2), Some(1)));
    assert_eq!(position_of(&out, 2), (None, None));
    assert_lanes_contiguous(&out);
    assert_absent_cleared(&out);
}

#[test]
fn test_soft_compress_only_touches_affected_heat() {
    let engine = SeedingEngine::new();
    let roster = vec![
        active(1, 1, 1),
        active(2, 1, 2),
        active(3, 1, 3),
        active(4, 2, 1),
        active(5, 2, 2),
        active(6, 2, 3),
    ];
    let before = engine.compress_lanes_within_heats(roster);

    let mut changed = before.clone();
    for c in changed.iter_mut().filter(|c| c.id == 2) {
        c.status = EntryStatus::Absent;
    }
    let after = engine.compress_lanes_within_heats(changed);

    for id in [4, 5, 6] {
        assert_eq!(position_of(&before, id), position_of(&after, id));
    }
    assert_eq!(position_of(&after, 1), (Some(1), Some(1)));
    assert_eq!(position_of(&after, 3), (Some(1), Some(2)));
    assert_lanes_contiguous(&after);
}

#[test]
fn test_soft_compress_orders_output_for_presentation() {
    let engine = SeedingEngine::new();
    let roster = vec![
        active(4, 2, 1),
        make_competitor(9, None, None, EntryStatus::Absent, None),
        active(1, 1, 2),
        active(3, 1, 1),
    ];

    let out = engine.compress_lanes_within_heats(roster);
    let ids: Vec<i64> = out.iter().map(|c| c.id).collect();

    // 缺席者组次为空，排在最后
    assert_eq!(ids, vec![3, 1, 4, 9]);
}

#[test]
fn test_soft_compress_tie_breaks_on_seed_then_name() {
    let engine = SeedingEngine::new();
    let roster = vec![
        Competitor::new(1, 1, "Zed").with_position(Some(1), None).with_seed_time(Some(3000)),
        Competitor::new(2, 1, "Amy").with_position(Some(1), None).with_seed_time(Some(3000)),
        Competitor::new(3, 1, "Bob").with_position(Some(1), None).with_seed_time(Some(2900)),
        Competitor::new(4, 1, "Cat").with_position(Some(1), None),
        Competitor::new(5, 1, "Dan").with_position(Some(1), Some(4)),
    ];

    let out = engine.compress_lanes_within_heats(roster);
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();

    // 有道次者优先，其次报名成绩，最后姓名
    assert_eq!(names, vec!["Dan", "Bob", "Amy", "Zed", "Cat"]);
    assert_lanes_contiguous(&out);
}

#[test]
fn test_soft_compress_folds_unassigned_into_first_heat() {
    let engine = SeedingEngine::new();
    let roster = vec![
        active(1, 1, 1),
        make_competitor(2, None, None, EntryStatus::Active, Some(2500)),
        active(3, 2, 1),
    ];

    let out = engine.compress_lanes_within_heats(roster);

    assert_eq!(position_of(&out, 1), (Some(1), Some(1)));
    assert_eq!(position_of(&out, 2), (Some(1), Some(2)));
    assert_eq!(position_of(&out, 3), (Some(2), Some(1)));
}

#[test]
fn test_soft_compress_is_idempotent() {
    let engine = SeedingEngine::new();
    let roster = vec![
        active(1, 2, 5),
        active(2, 1, 3),
        make_competitor(3, Some(1), Some(1), EntryStatus::Absent, Some(3100)),
        make_competitor(4, None, None, EntryStatus::Active, None),
        active(5, 2, 2),
        active(6, 3, 8),
    ];

    let once = engine.compress_lanes_within_heats(roster);
    let twice = engine.compress_lanes_within_heats(once.clone());

    assert_eq!(once, twice);
}

#[test]
fn test_soft_compress_empty_roster() {
    let engine = SeedingEngine::new();
    assert!(engine.compress_lanes_within_heats(Vec::new()).is_empty());
}

// ==========================================
// 整体重排
// ==========================================

#[test]
fn test_full_reseed_by_seed_time() {
    let engine = SeedingEngine::new();
    let roster = vec![
        make_competitor(1, Some(2), Some(3), EntryStatus::Active, Some(6100)),
        make_competitor(2, Some(1), Some(1), EntryStatus::Active, Some(5900)),
        make_competitor(3, Some(3), Some(4), EntryStatus::Active, Some(6500)),
        make_competitor(4, Some(1), Some(2), EntryStatus::Absent, Some(5000)),
    ];

    let out = engine.full_reseed(roster, lanes(2));
    let positions: Vec<(i64, Option<u32>, Option<u32>)> =
        out.iter().map(|c| (c.id, c.heat, c.lane)).collect();

    // 在册者按名次在前，缺席者在后
    assert_eq!(
        positions,
        vec![
            (2, Some(1), Some(1)),
            (1, Some(1), Some(2)),
            (3, Some(2), Some(1)),
            (4, None, None),
        ]
    );
}

#[test]
fn test_full_reseed_two_lanes() {
    let engine = SeedingEngine::new();
    let roster = vec![
        Competitor::new(4, 1, "W").with_seed_time(Some(6071)),
        Competitor::new(2, 1, "Y").with_seed_time(Some(5921)),
        Competitor::new(1, 1, "X").with_seed_time(Some(5888)),
        Competitor::new(3, 1, "Z").with_seed_time(Some(6043)),
    ];

    let out = engine.full_reseed(roster, lanes(2));
    let positions: Vec<(&str, Option<u32>, Option<u32>)> =
        out.iter().map(|c| (c.name.as_str(), c.heat, c.lane)).collect();

    assert_eq!(
        positions,
        vec![
            ("X", Some(1), Some(1)),
            ("Y", Some(1), Some(2)),
            ("Z", Some(2), Some(1)),
            ("W", Some(2), Some(2)),
        ]
    );
}

#[test]
fn test_full_reseed_missing_seed_sinks_regardless_of_name() {
    let engine = SeedingEngine::new();
    let roster = vec![
        Competitor::new(1, 1, "Aaron"),
        Competitor::new(2, 1, "Zoe").with_seed_time(Some(99_999_999)),
        Competitor::new(3, 1, "Mia").with_seed_time(Some(-50)),
    ];

    let out = engine.full_reseed(roster, lanes(8));
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();

    assert_eq!(names, vec!["Mia", "Zoe", "Aaron"]);
    assert_eq!(position_of(&out, 1), (Some(1), Some(3)));
}

#[test]
fn test_full_reseed_name_tie_break_is_case_sensitive() {
    let engine = SeedingEngine::new();
    let roster = vec![
        Competitor::new(1, 1, "bob").with_seed_time(Some(3000)),
        Competitor::new(2, 1, "Bob").with_seed_time(Some(3000)),
    ];

    let out = engine.full_reseed(roster, lanes(4));

    // 大写字母字节序更小
    assert_eq!(out[0].name, "Bob");
    assert_eq!(out[1].name, "bob");
}

#[test]
fn test_full_reseed_invariants_on_larger_roster() {
    let engine = SeedingEngine::new();
    let roster: Vec<Competitor> = (1..=37)
        .map(|id| {
            let status = if id % 5 == 0 {
                EntryStatus::Absent
            } else {
                EntryStatus::Active
            };
            let seed = if id % 7 == 0 { None } else { Some(3000 + (id * 37 % 23) as i64) };
            make_competitor(id, Some(9), Some(9), status, seed)
        })
        .collect();

    let out = engine.full_reseed(roster, lanes(6));

    assert_eq!(out.len(), 37);
    assert_lanes_contiguous(&out);
    assert_absent_cleared(&out);

    let pairs: BTreeSet<(u32, u32)> = out
        .iter()
        .filter(|c| !c.is_absent())
        .map(|c| (c.heat.unwrap(), c.lane.unwrap()))
        .collect();
    assert_eq!(pairs.len(), out.iter().filter(|c| !c.is_absent()).count());

    // 缺席者全部在末尾
    let first_absent = out.iter().position(|c| c.is_absent()).unwrap();
    assert!(out[first_absent..].iter().all(|c| c.is_absent()));
}

#[test]
fn test_full_reseed_then_soft_compress_keeps_assignment() {
    let engine = SeedingEngine::new();
    let roster: Vec<Competitor> = (1..=10)
        .map(|id| make_competitor(id, None, None, EntryStatus::Active, Some(4000 - id * 10)))
        .collect();

    let full = engine.full_reseed(roster, lanes(4));
    let soft = engine.compress_lanes_within_heats(full.clone());

    for c in &full {
        assert_eq!(position_of(&soft, c.id), (c.heat, c.lane));
    }
}
