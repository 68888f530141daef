// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、英文、俄文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::{EntryStatus, ReseedMode, ResultMark};

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 已提供翻译的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "en", "ru"];

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN"、"en" 或 "ru"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use swim_meet::i18n::t;
/// let msg = t("status.absent");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use swim_meet::i18n::t_with_args;
/// let msg = t_with_args("import.done", &[("events", "3"), ("competitors", "42")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 参赛状态的显示名称
pub fn status_label(status: EntryStatus) -> String {
    match status {
        EntryStatus::Active => t("status.active"),
        EntryStatus::Absent => t("status.absent"),
    }
}

/// 成绩标记的显示名称
pub fn mark_label(mark: ResultMark) -> String {
    match mark {
        ResultMark::Ok => t("mark.ok"),
        ResultMark::Dq => t("mark.dq"),
        ResultMark::Dns => t("mark.dns"),
        ResultMark::Dnf => t("mark.dnf"),
    }
}

/// 重排模式的说明文字
pub fn reseed_mode_label(mode: ReseedMode) -> String {
    match mode {
        ReseedMode::Soft => t("reseed.soft"),
        ReseedMode::Full => t("reseed.full"),
    }
}
