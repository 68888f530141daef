use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_repo() -> ActionLogRepository {
    let conn = crate::db::open_in_memory().unwrap();
    ActionLogRepository::new(Arc::new(Mutex::new(conn)))
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = setup_repo();

    let log = ActionLog::new(ActionType::MarkAbsent, Some(3))
        .with_payload(json!({ "competitor_ids": [1, 2] }))
        .with_detail("2 absent");
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.action_type, "MARK_ABSENT");
    assert_eq!(found.event_id, Some(3));
    assert_eq!(found.payload_json, Some(json!({ "competitor_ids": [1, 2] })));
    assert_eq!(found.detail.as_deref(), Some("2 absent"));
}

#[test]
fn test_find_by_id_missing() {
    let repo = setup_repo();
    assert!(repo.find_by_id("nope").unwrap().is_none());
}

#[test]
fn test_find_recent_newest_first() {
    let repo = setup_repo();
    let first = ActionLog::new(ActionType::ImportStartlist, None);
    let second = ActionLog::new(ActionType::Reseed, Some(1));
    repo.insert(&first).unwrap();
    repo.insert(&second).unwrap();

    let recent = repo.find_recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].action_id, second.action_id);

    assert_eq!(repo.find_recent(1).unwrap().len(), 1);
}

#[test]
fn test_find_by_event_and_count() {
    let repo = setup_repo();
    repo.insert(&ActionLog::new(ActionType::Reseed, Some(1))).unwrap();
    repo.insert(&ActionLog::new(ActionType::Reseed, Some(2))).unwrap();
    repo.insert(&ActionLog::new(ActionType::SaveResults, Some(1))).unwrap();

    assert_eq!(repo.find_by_event(1).unwrap().len(), 2);
    assert_eq!(repo.count_by_action_type("RESEED").unwrap(), 2);
    assert_eq!(repo.count_by_action_type("RESTORE").unwrap(), 0);
}
