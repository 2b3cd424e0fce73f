//! CLI 명령어 구현 모듈.
//!
//! 각 명령은 `run`으로 결과 구조체를 만들고 `render`로 출력 문자열을
//! 만듭니다. 출력은 `main`에서만 수행합니다.

pub mod scan;
pub mod suggest;
pub mod waves;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use wave_core::{DataConfig, Interval, Period, PriceSeries, SeriesRequest, SeriesSource};
use wave_data::CsvSeriesSource;

/// 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// 시계열 로딩 설정.
#[derive(Debug, Clone)]
pub struct DataArgs {
    /// CSV 디렉토리
    pub dir: PathBuf,
    /// 지정 파일 (있으면 디렉토리 규칙 무시)
    pub file: Option<PathBuf>,
    /// 조회 기간
    pub period: Period,
    /// 봉 간격
    pub interval: Interval,
}

impl From<&DataConfig> for DataArgs {
    fn from(config: &DataConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            file: None,
            period: config.period,
            interval: config.interval,
        }
    }
}

impl DataArgs {
    fn source(&self) -> CsvSeriesSource {
        match &self.file {
            Some(file) => CsvSeriesSource::from_file(file),
            None => CsvSeriesSource::new(&self.dir),
        }
    }

    /// 심볼의 시계열을 읽어옵니다.
    pub fn load(&self, symbol: &str) -> Result<PriceSeries> {
        let request = SeriesRequest::new(symbol)
            .with_period(self.period)
            .with_interval(self.interval);

        let series = self
            .source()
            .load(&request)
            .with_context(|| format!("Failed to load series for {}", symbol))?;

        info!(symbol, bars = series.len(), "Loaded price series");
        Ok(series)
    }
}

/// 날짜/시각 인자를 파싱합니다.
///
/// `YYYY-MM-DD` 형식이면 `end_of_day`에 따라 그날 00:00:00 또는
/// 23:59:59 (UTC)를 반환합니다. RFC3339 형식도 허용합니다.
pub fn parse_date(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {}. Use YYYY-MM-DD", value))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };

    time.map(|t| t.and_utc())
        .with_context(|| format!("Invalid date: {}", value))
}

/// JSON 형식 출력.
pub(crate) fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
}

/// 소수 퍼센트 표기 (`+1.23%`).
pub(crate) fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_parse_date_bounds() {
        assert_eq!(
            parse_date("2024-03-01", false).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2024-03-29", true).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 29, 23, 59, 59).unwrap()
        );
        assert_eq!(
            parse_date("2024-03-01T12:00:00Z", true).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert!(parse_date("03/01/2024", false).is_err());
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(Some(1.234)), "+1.23%");
        assert_eq!(format_pct(Some(-0.5)), "-0.50%");
        assert_eq!(format_pct(None), "-");
    }
}
