// ==========================================
// 出发名单导入集成测试
// ==========================================
// 测试目标: 文件 → 名单 → 编组 的端到端行为
// ==========================================

mod test_helpers;

use swim_meet::api::ApiError;
use swim_meet::domain::LaneCount;
use swim_meet::importer::{ImportError, StartlistImporter};
use test_helpers::{create_test_db, open_state, positions, seed_event, write_csv};

#[test]
fn test_import_keeps_file_heats_and_compresses_lanes() {
    let (dir, db_path) = create_test_db();
    let state = open_state(&db_path);
    let csv = write_csv(
        dir.path(),
        "50 free.csv",
        "Name,Year,Team,Seed,Heat/Lane\nSlow,2010,A,00:40:00,6/3\nFast,2011,B,00:30:00,5/1\nMid,2012,C,00:35:00,5/4\n",
    );

    let summary = state.meet_api.import_startlist(&csv).unwrap();
    assert_eq!(summary.events, 1);
    assert_eq!(summary.competitors, 3);
    assert_eq!(summary.lane_count, 8);

    let events = state.meet_api.list_events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "50 free");

    let out = state.meet_api.start_list(events[0].id, None).unwrap();
    assert_eq!(
        positions(&out),
        vec![
            ("Fast".to_string(), Some(5), Some(1)),
            ("Mid".to_string(), Some(5), Some(2)),
            ("Slow".to_string(), Some(6), Some(1)),
        ]
    );
    assert_eq!(out[0].seed_time, Some(3000));
    assert_eq!(out[0].team.as_deref(), Some("B"));
    assert_eq!(out[2].birth_year, Some(2010));
}

#[test]
fn test_import_replaces_previous_roster() {
    let (dir, db_path) = create_test_db();
    let state = open_state(&db_path);
    seed_event(&db_path, "old event", 8, &[("Old", Some(1), Some(1), None)]);

    let csv = write_csv(dir.path(), "relay.csv", "ФИО,Заявочное время\nИванов,35.5\n");
    state.meet_api.import_startlist(&csv).unwrap();

    let events = state.meet_api.list_events().unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["relay"]);

    let out = state.meet_api.start_list(events[0].id, None).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].seed_time, Some(3550));
}

#[test]
fn test_import_uses_configured_lane_count() {
    let (dir, db_path) = create_test_db();
    let state = open_state(&db_path);
    state
        .config_manager
        .set_default_lane_count(LaneCount::new(2).unwrap())
        .unwrap();

    let csv = write_csv(dir.path(), "50 back.csv", "Name,Seed\nA,30.00\nB,31.00\nC,32.00\n");
    let summary = state.meet_api.import_startlist(&csv).unwrap();
    assert_eq!(summary.lane_count, 2);

    let event_id = state.meet_api.list_events().unwrap()[0].id;
    let out = state.meet_api.start_list(event_id, None).unwrap();
    assert_eq!(
        positions(&out),
        vec![
            ("A".to_string(), Some(1), Some(1)),
            ("B".to_string(), Some(1), Some(2)),
            ("C".to_string(), Some(2), Some(1)),
        ]
    );
}

#[test]
fn test_legacy_xls_rejected_and_roster_untouched() {
    let (dir, db_path) = create_test_db();
    let state = open_state(&db_path);
    seed_event(&db_path, "keep me", 8, &[("A", Some(1), Some(1), None)]);

    let legacy = dir.path().join("startlist.xls");
    std::fs::write(&legacy, "legacy excel").unwrap();

    let err = state.meet_api.import_startlist(&legacy).unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));
    assert!(err.to_string().contains(".xls"));

    assert_eq!(state.meet_api.list_events().unwrap().len(), 1);
}

#[test]
fn test_importer_reports_missing_name_column() {
    let (dir, _db_path) = create_test_db();
    let csv = write_csv(dir.path(), "bad.csv", "Foo,Bar\n1,2\n");

    let result = StartlistImporter::new().import_file(&csv);
    assert!(matches!(result, Err(ImportError::MissingNameColumn(_))));
}

#[test]
fn test_import_is_logged_and_backed_up() {
    let (dir, db_path) = create_test_db();
    let state = open_state(&db_path);
    let csv = write_csv(dir.path(), "50 free.csv", "Name,Seed\nA,30.00\n");

    let backup = state.create_backup("import").unwrap();
    state.meet_api.import_startlist(&csv).unwrap();

    assert!(backup.exists());
    let actions = state.meet_api.recent_actions(5).unwrap();
    assert_eq!(actions[0].action_type, "IMPORT_STARTLIST");
    assert!(actions[0].event_id.is_none());
}
