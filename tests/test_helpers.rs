// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、测试名单、出发名单文件
// ==========================================

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use swim_meet::app::AppState;
use swim_meet::domain::{Competitor, LaneCount};
use swim_meet::logging;
use swim_meet::repository::{RosterStore, SqliteRosterRepository};
use tempfile::TempDir;

/// 创建临时目录中的测试数据库
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> (TempDir, String) {
    logging::init_test();
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let db_path = dir.path().join("meet.db").to_string_lossy().to_string();
    (dir, db_path)
}

/// 打开应用状态（建表 + 装配 API）
pub fn open_state(db_path: &str) -> AppState {
    AppState::new(db_path.to_string()).expect("初始化AppState失败")
}

/// 独立连接的名单仓储，用于准备测试数据
pub fn roster_repo(db_path: &str) -> SqliteRosterRepository {
    SqliteRosterRepository::new(db_path).expect("打开名单仓储失败")
}

/// 测试参赛者：(姓名, 组次, 道次, 报名成绩厘秒)
pub type Seed<'a> = (&'a str, Option<u32>, Option<u32>, Option<i64>);

/// 新建项目并写入参赛者，返回 (项目ID, 参赛者ID 列表)
pub fn seed_event(db_path: &str, name: &str, lanes: u32, swimmers: &[Seed<'_>]) -> (i64, Vec<i64>) {
    let repo = roster_repo(db_path);
    let event_id = repo
        .upsert_event(name, LaneCount::new(lanes).expect("道数必须为正"))
        .expect("新建项目失败");

    let rows: Vec<Competitor> = swimmers
        .iter()
        .map(|(swimmer, heat, lane, seed)| {
            Competitor::new(0, event_id, *swimmer)
                .with_position(*heat, *lane)
                .with_seed_time(*seed)
        })
        .collect();

    let ids = repo.insert_competitors(event_id, &rows).expect("写入参赛者失败");
    (event_id, ids)
}

/// 在目录中写入 CSV 出发名单
pub fn write_csv(dir: &Path, file_name: &str, contents: &str) -> PathBuf {
    let path = dir.join(file_name);
    let mut file = std::fs::File::create(&path).expect("创建 CSV 失败");
    file.write_all(contents.as_bytes()).expect("写入 CSV 失败");
    path
}

/// (姓名, 组次, 道次) 列表，便于断言
pub fn positions(competitors: &[Competitor]) -> Vec<(String, Option<u32>, Option<u32>)> {
    competitors
        .iter()
        .map(|c| (c.name.clone(), c.heat, c.lane))
        .collect()
}
