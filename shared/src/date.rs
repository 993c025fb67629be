//! 时间工具模块
//!
//! 后端返回的时间格式不统一（RFC 3339、无时区的 `YYYY-MM-DD HH:MM:SS`、
//! 纯日期）。入口处统一解析为 `chrono` 类型：
//! - `DateTime<Utc>`: 创建时间等时间点
//! - `NaiveDate`: 出生日期等纯日期

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// 新建成员缺少出生日期时使用的占位值
pub const PLACEHOLDER_BIRTH_DATE: &str = "1990-01-01";

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

// =========================================================
// 解析
// =========================================================

/// 当前时间
#[inline]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// 解析 ISO 风格的时间字符串
///
/// 无时区信息的值按 UTC 处理。返回 None 如果解析失败。
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// 解析日期，只取前 10 个字符 (`YYYY-MM-DD`)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// 占位出生日期
pub fn placeholder_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}

// =========================================================
// 格式化
// =========================================================

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `<input type="date">` 使用的值，空日期为空串
pub fn input_value(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// 对原始字符串做尽力格式化，无法解析时原样返回
pub fn display(raw: &str) -> String {
    parse_datetime(raw)
        .map(|dt| format_datetime(&dt))
        .unwrap_or_else(|| raw.to_string())
}

// =========================================================
// serde 适配
// =========================================================

/// 缺失或无法解析时取当前时间
pub fn datetime_or_now<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime).unwrap_or_else(now))
}

/// 缺失、空串或无法解析时为 `None`
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_common_backend_formats() {
        let rfc = parse_datetime("2024-03-05T10:20:30.000Z").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day(), rfc.hour()), (2024, 3, 5, 10));

        let offset = parse_datetime("2024-03-05T12:20:30+02:00").unwrap();
        assert_eq!(offset.hour(), 10);

        let naive = parse_datetime("2024-03-05 10:20:30").unwrap();
        assert_eq!(naive.minute(), 20);

        let date_only = parse_datetime("2024-03-05").unwrap();
        assert_eq!(date_only.hour(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_date("05/03/2024").is_none());
    }

    #[test]
    fn date_uses_leading_component() {
        let d = parse_date("1985-12-31T00:00:00.000Z").unwrap();
        assert_eq!(d.to_string(), "1985-12-31");
        assert_eq!(placeholder_birth_date().to_string(), PLACEHOLDER_BIRTH_DATE);
    }

    #[test]
    fn date_input_value_round_trips() {
        assert_eq!(input_value(None), "");
        let d = parse_date("2001-07-09").unwrap();
        assert_eq!(input_value(Some(d)), "2001-07-09");
        assert_eq!(parse_date(&input_value(Some(d))), Some(d));
    }

    #[test]
    fn display_falls_back_to_raw() {
        assert_eq!(display("2024-01-02T03:04:05Z"), "2024-01-02 03:04");
        assert_eq!(display("n/a"), "n/a");
    }
}
