//! 봉 간격 및 조회 기간 정의.
//!
//! 데이터 제공자에게 시계열을 요청할 때 사용하는 `(symbol, period, interval)`
//! 중 `period`와 `interval`을 표현합니다.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 봉 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 5분봉
    #[serde(rename = "5m")]
    M5,
    /// 15분봉
    #[serde(rename = "15m")]
    M15,
    /// 30분봉
    #[serde(rename = "30m")]
    M30,
    /// 1시간봉
    #[serde(rename = "1h", alias = "60m")]
    H1,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
    /// 주봉
    #[serde(rename = "1wk", alias = "1w")]
    W1,
    /// 월봉
    #[serde(rename = "1mo")]
    MN1,
}

impl Interval {
    /// 이 간격의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::M5 => Duration::from_secs(5 * 60),
            Interval::M15 => Duration::from_secs(15 * 60),
            Interval::M30 => Duration::from_secs(30 * 60),
            Interval::H1 => Duration::from_secs(60 * 60),
            Interval::D1 => Duration::from_secs(24 * 60 * 60),
            Interval::W1 => Duration::from_secs(7 * 24 * 60 * 60),
            Interval::MN1 => Duration::from_secs(30 * 24 * 60 * 60), // 근사값
        }
    }

    /// 장중(일봉 미만) 간격인지 확인합니다.
    pub fn is_intraday(&self) -> bool {
        self.duration() < Interval::D1.duration()
    }

    /// Yahoo Finance 간격 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
            Interval::W1 => "1wk",
            Interval::MN1 => "1mo",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::D1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" => Ok(Interval::M5),
            "15m" => Ok(Interval::M15),
            "30m" => Ok(Interval::M30),
            "1h" | "60m" => Ok(Interval::H1),
            "1d" => Ok(Interval::D1),
            "1w" | "1wk" => Ok(Interval::W1),
            "1mo" => Ok(Interval::MN1),
            _ => Err(format!("Unknown interval: {}", s)),
        }
    }
}

/// 조회 기간 (마지막 봉 기준 과거 범위).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// 최근 1개월
    #[serde(rename = "1mo")]
    OneMonth,
    /// 최근 6개월
    #[serde(rename = "6mo")]
    SixMonths,
    /// 최근 1년
    #[serde(rename = "1y")]
    OneYear,
    /// 최근 2년
    #[serde(rename = "2y")]
    TwoYears,
    /// 최근 5년
    #[serde(rename = "5y")]
    FiveYears,
    /// 전체 이력
    Max,
}

impl Period {
    /// 기간의 개월 수. `Max`는 `None`.
    pub fn months(&self) -> Option<u32> {
        match self {
            Period::OneMonth => Some(1),
            Period::SixMonths => Some(6),
            Period::OneYear => Some(12),
            Period::TwoYears => Some(24),
            Period::FiveYears => Some(60),
            Period::Max => None,
        }
    }

    /// `last` 기준으로 이 기간이 시작되는 시각을 반환합니다. `Max`는 `None`.
    pub fn cutoff(&self, last: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.months()
            .and_then(|m| last.checked_sub_months(Months::new(m)))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::OneYear
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "max" => Ok(Period::Max),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}
