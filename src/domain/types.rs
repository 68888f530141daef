// ==========================================
// 游泳比赛编组系统 - 领域类型定义
// ==========================================
// 职责: 参赛状态、成绩标记、重排模式等封闭枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 参赛状态 (Entry Status)
// ==========================================
// 状态机: ACTIVE --mark_absent--> ABSENT --restore--> ACTIVE
// 红线: ABSENT 的运动员 heat/lane 必须为空
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    #[default]
    Active, // 在册，参与编组
    Absent, // 未到场，不参与编组
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl EntryStatus {
    /// 从字符串解析状态
    ///
    /// 兼容旧库中的 "OK" / "DNS" 写法；未知值按 ACTIVE 处理
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "ABSENT" | "DNS" => EntryStatus::Absent,
            _ => EntryStatus::Active,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntryStatus::Active => "ACTIVE",
            EntryStatus::Absent => "ABSENT",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EntryStatus::Absent)
    }
}

// ==========================================
// 成绩标记 (Result Mark)
// ==========================================
// 引擎只关心 "有效" 与 "无效"，具体词表在此集中定义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultMark {
    #[default]
    Ok,  // 有效成绩
    Dq,  // 取消资格
    Dns, // 未出发
    Dnf, // 未完成
}

impl fmt::Display for ResultMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ResultMark {
    /// 从字符串解析成绩标记
    ///
    /// # 返回
    /// - 空字符串视为 OK（录入界面留空即有效）
    /// - 未知标记返回 None，由调用方决定如何处理
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "" | "OK" => Some(ResultMark::Ok),
            "DQ" | "DSQ" => Some(ResultMark::Dq),
            "DNS" => Some(ResultMark::Dns),
            "DNF" => Some(ResultMark::Dnf),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResultMark::Ok => "OK",
            ResultMark::Dq => "DQ",
            ResultMark::Dns => "DNS",
            ResultMark::Dnf => "DNF",
        }
    }

    /// 是否可参与名次计算
    pub fn is_valid(&self) -> bool {
        matches!(self, ResultMark::Ok)
    }

    pub fn is_disqualified(&self) -> bool {
        matches!(self, ResultMark::Dq)
    }
}

// ==========================================
// 重排模式 (Reseed Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReseedMode {
    #[default]
    Soft, // 仅压缩组内道次，组号不变
    Full, // 按报名成绩整体重排
}

impl fmt::Display for ReseedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ReseedMode {
    /// 从字符串解析重排模式（未知值返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SOFT" => Some(ReseedMode::Soft),
            "FULL" => Some(ReseedMode::Full),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ReseedMode::Soft => "SOFT",
            ReseedMode::Full => "FULL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_status_accepts_legacy_codes() {
        assert_eq!(EntryStatus::from_str("DNS"), EntryStatus::Absent);
        assert_eq!(EntryStatus::from_str("absent"), EntryStatus::Absent);
        assert_eq!(EntryStatus::from_str("OK"), EntryStatus::Active);
        assert_eq!(EntryStatus::from_str("ACTIVE"), EntryStatus::Active);
    }

    #[test]
    fn test_result_mark_vocabulary() {
        assert_eq!(ResultMark::from_str(""), Some(ResultMark::Ok));
        assert_eq!(ResultMark::from_str(" dq "), Some(ResultMark::Dq));
        assert_eq!(ResultMark::from_str("DNF"), Some(ResultMark::Dnf));
        assert_eq!(ResultMark::from_str("???"), None);

        assert!(ResultMark::Ok.is_valid());
        assert!(!ResultMark::Dns.is_valid());
        assert!(ResultMark::Dq.is_disqualified());
    }

    #[test]
    fn test_reseed_mode_parse() {
        assert_eq!(ReseedMode::from_str("full"), Some(ReseedMode::Full));
        assert_eq!(ReseedMode::from_str("SOFT"), Some(ReseedMode::Soft));
        assert_eq!(ReseedMode::from_str("partial"), None);
        assert_eq!(ReseedMode::Full.to_string(), "FULL");
    }
}
