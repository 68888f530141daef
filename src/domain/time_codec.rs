// ==========================================
// 游泳比赛编组系统 - 时间编解码
// ==========================================
// 职责: 文本时间 ⇄ 厘秒 (1/100 秒) 整数
// 红线: 无法识别的文本返回 None，不报错
// ==========================================

/// 厘秒（百分之一秒），用于精确比较，避免浮点误差
pub type Centiseconds = i64;

/// 解析时间文本为厘秒
///
/// # 支持格式
/// - `M:SS:CC` / `M.SS.CC`（分隔符可混用 `:` 与 `.`，分钟位数不限，可带前导 `-`）
/// - 纯秒数：`35` → 3500
/// - 秒 + 小数：`35.5` → 3550，`35.123` → 3512（只取前两位）
///
/// 逗号视为小数点，首尾空白忽略。
///
/// # 返回
/// - Some(厘秒): 解析成功
/// - None: 空文本或无法识别
pub fn parse_time_to_cs(text: &str) -> Option<Centiseconds> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    if let Some(value) = parse_clock(&normalized) {
        return Some(value);
    }

    if let Some((secs_part, centis_part)) = normalized.split_once('.') {
        if is_digits(secs_part) && is_digits(centis_part) {
            let seconds: i64 = secs_part.parse().ok()?;
            let padded = format!("{}00", centis_part);
            let centis: i64 = padded[..2].parse().ok()?;
            return seconds.checked_mul(100)?.checked_add(centis);
        }
        return None;
    }

    if is_digits(&normalized) {
        return normalized.parse::<i64>().ok()?.checked_mul(100);
    }

    None
}

/// 将厘秒格式化为 `MM:SS:CC`
///
/// None 返回空字符串；负值带前导 `-`
pub fn format_time_cs(value: Option<Centiseconds>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let sign = if value < 0 { "-" } else { "" };
    let total = value.unsigned_abs();
    let centis = total % 100;
    let total_seconds = total / 100;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    format!("{}{:02}:{:02}:{:02}", sign, minutes, seconds, centis)
}

// `M:SS:CC` 形式
fn parse_clock(text: &str) -> Option<Centiseconds> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let parts: Vec<&str> = body.split(|c| c == ':' || c == '.').collect();
    if parts.len() != 3 {
        return None;
    }

    let (minutes, seconds, centis) = (parts[0], parts[1], parts[2]);
    if !is_digits(minutes) || seconds.len() != 2 || !is_digits(seconds) {
        return None;
    }
    if centis.len() != 2 || !is_digits(centis) {
        return None;
    }

    // 按 i128 计算后再收窄，负向可以取到 i64::MIN
    let minutes: i128 = minutes.parse().ok()?;
    let seconds: i128 = seconds.parse().ok()?;
    let centis: i128 = centis.parse().ok()?;

    let magnitude = minutes
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(100)?
        .checked_add(centis)?;

    Centiseconds::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
