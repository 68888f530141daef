// ==========================================
// 游泳比赛编组系统 - 参赛名单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（不解析时间、不做编组）
// 约束: 所有查询使用参数化,批量写入使用事务
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::competitor::{Competitor, Event, LaneCount, ResultUpdate};
use crate::domain::types::{EntryStatus, ResultMark};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// RosterStore Trait
// ==========================================
// 用途: 编组/名次流程所需的名单读写接口
// 实现者: SqliteRosterRepository
pub trait RosterStore: Send + Sync {
    // ===== 项目 =====

    /// 列出全部项目（按 id 排序）
    fn list_events(&self) -> RepositoryResult<Vec<Event>>;

    /// 按 id 查询项目
    fn find_event(&self, event_id: i64) -> RepositoryResult<Option<Event>>;

    /// 按名称新增项目（已存在则直接返回其 id，不修改道数）
    fn upsert_event(&self, name: &str, lane_count: LaneCount) -> RepositoryResult<i64>;

    /// 修改项目道数
    fn set_lane_count(&self, event_id: i64, lane_count: LaneCount) -> RepositoryResult<()>;

    // ===== 参赛者 =====

    /// 批量新增参赛者（忽略入参中的 id，返回数据库分配的 id）
    fn insert_competitors(&self, event_id: i64, competitors: &[Competitor]) -> RepositoryResult<Vec<i64>>;

    /// 列出项目的参赛者
    ///
    /// 排序: 组次 → 道次 → 姓名（组次/道次为空者沉底）
    /// search: 姓名模糊匹配（不区分大小写，含西里尔字母）
    fn list_competitors(&self, event_id: i64, search: Option<&str>) -> RepositoryResult<Vec<Competitor>>;

    /// 批量写回组次/道次/状态（编组引擎的输出）
    fn update_positions(&self, competitors: &[Competitor]) -> RepositoryResult<usize>;

    /// 批量写入成绩字段
    fn set_results(&self, updates: &[ResultUpdate]) -> RepositoryResult<usize>;

    /// 标记缺席：状态置 ABSENT 并清空组次/道次
    fn mark_absent(&self, event_id: i64, competitor_ids: &[i64]) -> RepositoryResult<usize>;

    /// 恢复参赛：状态置 ACTIVE（组次/道次由后续编组决定）
    fn restore(&self, event_id: i64, competitor_ids: &[i64]) -> RepositoryResult<usize>;

    /// 清空全部项目与参赛者（重新导入前调用）
    fn clear_all(&self) -> RepositoryResult<()>;
}

// ==========================================
// SqliteRosterRepository - 名单仓储 (rusqlite)
// ==========================================
pub struct SqliteRosterRepository {
    conn: Arc<Mutex<Connection>>,
}

const COMPETITOR_COLUMNS: &str = r#"
    id, event_id, name, birth_year, team,
    seed_time_raw, seed_time_cs, heat, lane,
    result_time_raw, result_time_cs, result_status, status
"#;

impl SqliteRosterRepository {
    /// 创建新的仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
        let lanes: u32 = row.get(2)?;
        Ok(Event {
            id: row.get(0)?,
            name: row.get(1)?,
            lane_count: LaneCount::new(lanes).unwrap_or_default(),
        })
    }

    fn map_competitor_row(row: &Row<'_>) -> rusqlite::Result<Competitor> {
        let mark: String = row.get(11)?;
        let status: String = row.get(12)?;
        Ok(Competitor {
            id: row.get(0)?,
            event_id: row.get(1)?,
            name: row.get(2)?,
            birth_year: row.get(3)?,
            team: row.get(4)?,
            seed_time_raw: row.get(5)?,
            seed_time: row.get(6)?,
            heat: row.get(7)?,
            lane: row.get(8)?,
            result_time_raw: row.get(9)?,
            result_time: row.get(10)?,
            result_mark: ResultMark::from_str(&mark).unwrap_or(ResultMark::Ok),
            status: EntryStatus::from_str(&status),
        })
    }

    /// 在同一事务内逐条更新，任一 id 不属于该项目即整体回滚
    fn update_status(
        &self,
        event_id: i64,
        competitor_ids: &[i64],
        sql: &str,
    ) -> RepositoryResult<usize> {
        if competitor_ids.is_empty() {
            return Ok(0);
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for id in competitor_ids {
            let changed = tx.execute(sql, params![id, event_id])?;
            if changed == 0 {
                return Err(RepositoryError::CompetitorNotInEvent {
                    event_id,
                    competitor_id: *id,
                });
            }
            count += changed;
        }

        tx.commit()?;
        Ok(count)
    }
}

impl RosterStore for SqliteRosterRepository {
    fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, lane_count FROM event ORDER BY id")?;
        let events = stmt
            .query_map([], Self::map_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn find_event(&self, event_id: i64) -> RepositoryResult<Option<Event>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT id, name, lane_count FROM event WHERE id = ?1",
            params![event_id],
            Self::map_event_row,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn upsert_event(&self, name: &str, lane_count: LaneCount) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO event (name, lane_count) VALUES (?1, ?2)",
            params![name, lane_count.get()],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM event WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn set_lane_count(&self, event_id: i64, lane_count: LaneCount) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE event SET lane_count = ?1 WHERE id = ?2",
            params![lane_count.get(), event_id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Event".to_string(),
                id: event_id.to_string(),
            });
        }
        Ok(())
    }

    fn insert_competitors(&self, event_id: i64, competitors: &[Competitor]) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut ids = Vec::with_capacity(competitors.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO competitor (
                    event_id, name, birth_year, team, seed_time_raw, seed_time_cs,
                    heat, lane, result_time_raw, result_time_cs, result_status, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;

            for c in competitors {
                stmt.execute(params![
                    event_id,
                    c.name,
                    c.birth_year,
                    c.team,
                    c.seed_time_raw,
                    c.seed_time,
                    c.heat,
                    c.lane,
                    c.result_time_raw,
                    c.result_time,
                    c.result_mark.to_db_str(),
                    c.status.to_db_str(),
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }

        tx.commit()?;
        debug!(event_id, count = ids.len(), "参赛者已写入");
        Ok(ids)
    }

    fn list_competitors(&self, event_id: i64, search: Option<&str>) -> RepositoryResult<Vec<Competitor>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM competitor WHERE event_id = ?1 \
             ORDER BY heat IS NULL, heat, lane IS NULL, lane, name",
            COMPETITOR_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let competitors = stmt
            .query_map(params![event_id], Self::map_competitor_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // SQLite 的 lower() 只处理 ASCII，西里尔字母姓名需在这里折叠大小写
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(match needle {
            Some(needle) => competitors
                .into_iter()
                .filter(|c| c.name.to_lowercase().contains(&needle))
                .collect(),
            None => competitors,
        })
    }

    fn update_positions(&self, competitors: &[Competitor]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for c in competitors {
            let changed = tx.execute(
                "UPDATE competitor SET heat = ?1, lane = ?2, status = ?3 WHERE id = ?4",
                params![c.heat, c.lane, c.status.to_db_str(), c.id],
            )?;
            if changed == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Competitor".to_string(),
                    id: c.id.to_string(),
                });
            }
            count += changed;
        }

        tx.commit()?;
        Ok(count)
    }

    fn set_results(&self, updates: &[ResultUpdate]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for u in updates {
            let changed = tx.execute(
                r#"
                UPDATE competitor
                SET result_time_raw = ?1, result_time_cs = ?2, result_status = ?3
                WHERE id = ?4
                "#,
                params![
                    u.result_time_raw,
                    u.result_time,
                    u.result_mark.to_db_str(),
                    u.competitor_id
                ],
            )?;
            if changed == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "Competitor".to_string(),
                    id: u.competitor_id.to_string(),
                });
            }
            count += changed;
        }

        tx.commit()?;
        Ok(count)
    }

    fn mark_absent(&self, event_id: i64, competitor_ids: &[i64]) -> RepositoryResult<usize> {
        self.update_status(
            event_id,
            competitor_ids,
            "UPDATE competitor SET status = 'ABSENT', heat = NULL, lane = NULL WHERE id = ?1 AND event_id = ?2",
        )
    }

    fn restore(&self, event_id: i64, competitor_ids: &[i64]) -> RepositoryResult<usize> {
        self.update_status(
            event_id,
            competitor_ids,
            "UPDATE competitor SET status = 'ACTIVE' WHERE id = ?1 AND event_id = ?2",
        )
    }

    fn clear_all(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM competitor", [])?;
        tx.execute("DELETE FROM event", [])?;
        tx.commit()?;
        info!("参赛名单已清空");
        Ok(())
    }
}
