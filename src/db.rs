// ==========================================
// 游泳比赛编组系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少偶发 busy 错误
// - 建表与旧库字段补齐集中在此处
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS event (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    lane_count INTEGER NOT NULL DEFAULT 8 CHECK (lane_count > 0)
);

CREATE TABLE IF NOT EXISTS competitor (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES event(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    birth_year INTEGER,
    team TEXT,
    seed_time_raw TEXT,
    seed_time_cs INTEGER,
    heat INTEGER,
    lane INTEGER,
    result_time_raw TEXT,
    result_time_cs INTEGER,
    result_status TEXT NOT NULL DEFAULT 'OK',
    status TEXT NOT NULL DEFAULT 'ACTIVE'
);

CREATE INDEX IF NOT EXISTS idx_competitor_event ON competitor(event_id);
CREATE INDEX IF NOT EXISTS idx_competitor_name ON competitor(name);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    event_id INTEGER,
    payload_json TEXT,
    detail TEXT
);

CREATE INDEX IF NOT EXISTS idx_action_log_ts ON action_log(action_ts);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接、应用统一配置并确保 schema 就绪
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// 打开内存库（测试/临时计算用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并补齐旧库缺失的成绩字段
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    migrate_competitor_table(conn)?;

    let current = read_schema_version(conn)?;
    if current.map_or(true, |v| v < CURRENT_SCHEMA_VERSION) {
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
        info!(from = ?current, to = CURRENT_SCHEMA_VERSION, "schema_version 已更新");
    }
    Ok(())
}

/// 旧库只有出发名单字段，成绩字段需要补齐（新库为空操作）
fn migrate_competitor_table(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(competitor)")?;
    let columns: HashSet<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<_>>()?;

    let migrations = [
        ("result_time_raw", "ALTER TABLE competitor ADD COLUMN result_time_raw TEXT"),
        ("result_time_cs", "ALTER TABLE competitor ADD COLUMN result_time_cs INTEGER"),
        (
            "result_status",
            "ALTER TABLE competitor ADD COLUMN result_status TEXT NOT NULL DEFAULT 'OK'",
        ),
    ];

    for (column, sql) in migrations {
        if !columns.contains(column) {
            conn.execute(sql, [])?;
            info!(column, "competitor 表已补齐字段");
        }
    }
    Ok(())
}

/// 将当前库完整复制到 dest（VACUUM INTO，得到一致的快照）
///
/// dest 已存在时 SQLite 会报错，调用方负责生成不重复的文件名
pub fn backup_database(conn: &Connection, dest: &Path) -> rusqlite::Result<()> {
    let dest = dest.to_string_lossy().to_string();
    conn.execute("VACUUM INTO ?1", [dest])?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
