// ==========================================
// 游泳比赛编组系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪（谁在何时对哪个项目做了什么）
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

// ==========================================
// ActionLog - 操作日志
// ==========================================
// 对齐: action_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,             // 日志ID (UUID)
    pub action_type: String,           // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,      // 操作时间戳 (UTC)
    pub event_id: Option<i64>,         // 关联项目 (导入/清库为 None)
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,        // 详细描述
}

impl ActionLog {
    /// 以当前时间创建一条日志
    pub fn new(action_type: ActionType, event_id: Option<i64>) -> Self {
        Self {
            action_id: Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: Utc::now().naive_utc(),
            event_id,
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    ClearRoster,    // 清空名单
    ImportStartlist, // 导入出发名单
    MarkAbsent,     // 标记缺席
    Restore,        // 恢复参赛
    Reseed,         // 重新编组
    SaveResults,    // 录入成绩
    UpdateConfig,   // 修改配置
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::ClearRoster => "CLEAR_ROSTER",
            ActionType::ImportStartlist => "IMPORT_STARTLIST",
            ActionType::MarkAbsent => "MARK_ABSENT",
            ActionType::Restore => "RESTORE",
            ActionType::Reseed => "RESEED",
            ActionType::SaveResults => "SAVE_RESULTS",
            ActionType::UpdateConfig => "UPDATE_CONFIG",
        };
        write!(f, "{}", s)
    }
}
