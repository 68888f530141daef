// ==========================================
// 游泳比赛编组系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, scope_id='global')
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::competitor::LaneCount;
use crate::domain::types::ReseedMode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    // ===== 编组配置 =====

    /// 导入时新建项目使用的道数（配置值非法时回退到 8）
    pub fn get_default_lane_count(&self) -> RepositoryResult<LaneCount> {
        let value = self.get_config_or_default(config_keys::DEFAULT_LANE_COUNT, "8")?;
        let lanes = value.trim().parse::<u32>().ok().and_then(LaneCount::new);
        if lanes.is_none() {
            warn!(config_key = config_keys::DEFAULT_LANE_COUNT, value = %value, "配置值非法，使用默认道数");
        }
        Ok(lanes.unwrap_or_default())
    }

    pub fn set_default_lane_count(&self, lanes: LaneCount) -> RepositoryResult<()> {
        self.set_global_config_value(config_keys::DEFAULT_LANE_COUNT, &lanes.get().to_string())
    }

    /// 未显式指定模式时使用的重新编组模式
    pub fn get_default_reseed_mode(&self) -> RepositoryResult<ReseedMode> {
        let value = self.get_config_or_default(config_keys::DEFAULT_RESEED_MODE, "SOFT")?;
        Ok(ReseedMode::from_str(&value).unwrap_or_else(|| {
            warn!(config_key = config_keys::DEFAULT_RESEED_MODE, value = %value, "配置值非法，使用 SOFT");
            ReseedMode::Soft
        }))
    }

    pub fn set_default_reseed_mode(&self, mode: ReseedMode) -> RepositoryResult<()> {
        self.set_global_config_value(config_keys::DEFAULT_RESEED_MODE, mode.to_db_str())
    }

    // ===== 界面配置 =====

    pub fn get_locale(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::LOCALE, crate::i18n::DEFAULT_LOCALE)
    }

    pub fn set_locale(&self, locale: &str) -> RepositoryResult<()> {
        self.set_global_config_value(config_keys::LOCALE, locale)
    }

    // ===== 快照 =====

    /// 获取所有配置的快照（JSON格式，键有序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let config_map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::Other(anyhow::Error::new(e)))
    }

    /// 从配置快照恢复配置（覆盖同名键，返回写入条数）
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let config_map: BTreeMap<String, String> =
            serde_json::from_str(snapshot_json).map_err(|e| RepositoryError::FieldValueError {
                field: "snapshot_json".to_string(),
                message: e.to_string(),
            })?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (key, value) in &config_map {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 编组
    pub const DEFAULT_LANE_COUNT: &str = "default_lane_count";
    pub const DEFAULT_RESEED_MODE: &str = "default_reseed_mode";

    // 界面
    pub const LOCALE: &str = "locale";
}
