//! CSV 필드 파싱.
//!
//! 시장 데이터 내보내기 파일에 흔히 나타나는 날짜/숫자 표기를 처리합니다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// 시간대 없는 날짜/시각 형식.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 타임스탬프를 파싱합니다.
///
/// 지원 형식:
/// - `2024-03-01` (자정 UTC)
/// - `2024-03-01 09:30:00`, `2024-03-01T09:30:00` (UTC로 간주)
/// - `2024-03-01T09:30:00Z`, `2024-03-01 09:30:00-05:00`
///
/// 시간대가 붙은 값은 시간대를 버리고 현지 시각을 그대로 UTC 값으로 씁니다.
/// 일봉 날짜가 전날로 밀리지 않습니다.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local().and_utc());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 가격을 파싱합니다. 지수 표기(`1.2e-3`)도 허용합니다.
pub fn parse_price(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// 결측값 표기인지 확인합니다.
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("none")
}
