// ==========================================
// 游泳比赛编组系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::{ApiError, ApiResult, MeetApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{backup_database, open_sqlite_connection};
use crate::repository::{ActionLogRepository, RepositoryError, SqliteRosterRepository};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 赛事API
    pub meet_api: Arc<MeetApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// 打开数据库并装配各层
    pub fn new(db_path: String) -> ApiResult<Self> {
        info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(RepositoryError::from)?;
        let conn = Arc::new(Mutex::new(conn));

        let roster = Arc::new(SqliteRosterRepository::from_connection(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        let locale = config_manager.get_locale()?;
        if crate::i18n::is_supported(&locale) {
            crate::i18n::set_locale(&locale);
        } else {
            warn!(locale = %locale, "不支持的语言，保持默认");
        }

        let meet_api = Arc::new(MeetApi::new(roster, config_manager.clone(), action_log_repo));

        Ok(Self {
            db_path,
            meet_api,
            config_manager,
            conn,
        })
    }

    /// 备份数据库到 `<数据库目录>/backups/meet-<原因>-<时间>.db`
    pub fn create_backup(&self, reason: &str) -> ApiResult<PathBuf> {
        let db_path = PathBuf::from(&self.db_path);
        let backup_dir = db_path
            .parent()
            .map(|p| p.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        std::fs::create_dir_all(&backup_dir)
            .map_err(|e| ApiError::InvalidInput(format!("无法创建备份目录: {}", e)))?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let mut backup_path = backup_dir.join(format!("meet-{}-{}.db", reason, stamp));
        let mut suffix = 1;
        while backup_path.exists() {
            backup_path = backup_dir.join(format!("meet-{}-{}-{}.db", reason, stamp, suffix));
            suffix += 1;
        }

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        backup_database(&conn, &backup_path).map_err(RepositoryError::from)?;

        info!(path = %backup_path.display(), "数据库已备份");
        Ok(backup_path)
    }
}

/// 获取默认数据库路径
///
/// 优先级: SWIM_MEET_DB_PATH 环境变量 → 用户数据目录 → ./swim_meet.db
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("SWIM_MEET_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./swim_meet.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("swim-meet");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("swim_meet.db");
        }
    }

    path.to_string_lossy().to_string()
}
