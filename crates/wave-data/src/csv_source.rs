//! CSV 파일 기반 가격 시계열 제공자.
//!
//! 시장 데이터 제공자에서 내보낸 일봉/분봉 CSV를 읽어 `PriceSeries`로
//! 변환합니다.
//!
//! # 파일 규칙
//!
//! - 일봉: `<dir>/<symbol>.csv`
//! - 그 외 간격: `<dir>/<symbol>_<interval>.csv` (예: `EURUSD=X_1h.csv`)
//! - `from_file`로 생성하면 요청과 무관하게 지정된 파일을 읽습니다.
//!
//! # 컬럼
//!
//! | 용도 | 허용 헤더 (대소문자 무시) |
//! |------|---------------------------|
//! | 시각 | `Datetime`, `Date`, `index`, 또는 이름 없는/`Price` 첫 컬럼 |
//! | 종가 | `Close`, 없으면 `Adj Close` |
//! | 시가/고가/저가 | `Open`, `High`, `Low` (없으면 종가로 채움) |
//!
//! yfinance의 다단 헤더 내보내기(`Price,Close,...` / `Ticker,SPY,...` /
//! `Date,,,`)는 첫 행만 헤더로 쓰고 이어지는 `Ticker`/`Date` 행을 건너뜁니다.
//!
//! 종가가 비어 있거나 `NaN`인 행(휴장일 등)은 건너뜁니다. 행은 시각
//! 오름차순으로 정렬되며 중복 시각은 `InvalidData`로 거부됩니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use wave_core::{Period, SeriesRequest, SeriesSource};
//! use wave_data::CsvSeriesSource;
//!
//! let source = CsvSeriesSource::new("data");
//! let series = source.load(&SeriesRequest::new("EURUSD=X").with_period(Period::TwoYears))?;
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};
use wave_core::{Bar, Interval, PriceSeries, SeriesRequest, SeriesSource};

use crate::error::{DataError, Result};
use crate::parse::{is_missing, parse_price, parse_timestamp};

/// 시각 컬럼으로 인식하는 헤더.
const TIMESTAMP_HEADERS: &[&str] = &["datetime", "date", "index"];

/// 다단 헤더에서 컬럼 이름 행의 첫 칸.
const MULTI_HEADER_LEVEL: &str = "price";

/// 다단 헤더에서 데이터 앞에 오는 보조 행의 첫 칸.
const MULTI_HEADER_ROWS: &[&str] = &["ticker", "datetime", "date"];

/// 헤더에서 찾은 컬럼 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub timestamp: usize,
    pub open: Option<usize>,
    pub high: Option<usize>,
    pub low: Option<usize>,
    pub close: usize,
    /// 종가 대신 수정 종가를 사용하는지 여부
    pub adjusted_close: bool,
}

impl ColumnLayout {
    /// 헤더 행에서 컬럼 위치를 찾습니다.
    ///
    /// # 에러
    ///
    /// 시각 컬럼이나 종가(`Close`/`Adj Close`) 컬럼이 없으면 `MissingColumn`.
    pub fn resolve(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let timestamp = TIMESTAMP_HEADERS
            .iter()
            .find_map(|name| find(name))
            .or_else(|| {
                headers
                    .get(0)
                    .map(str::trim)
                    .filter(|h| h.is_empty() || h.eq_ignore_ascii_case(MULTI_HEADER_LEVEL))
                    .map(|_| 0)
            })
            .ok_or_else(|| DataError::MissingColumn("Datetime".to_string()))?;

        let (close, adjusted_close) = match (find("close"), find("adj close")) {
            (Some(idx), _) => (idx, false),
            (None, Some(idx)) => (idx, true),
            (None, None) => return Err(DataError::MissingColumn("Close".to_string())),
        };

        Ok(Self {
            timestamp,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close,
            adjusted_close,
        })
    }

    /// 다단 헤더의 보조 행(`Ticker,SPY,...`, `Date,,,`)인지 확인합니다.
    fn is_header_row(&self, record: &StringRecord) -> bool {
        record.get(self.timestamp).is_some_and(|value| {
            MULTI_HEADER_ROWS
                .iter()
                .any(|name| value.trim().eq_ignore_ascii_case(name))
        })
    }

    /// 한 행을 봉으로 변환합니다. 종가가 결측이면 `None`.
    fn parse_record(&self, record: &StringRecord, line: u64) -> Result<Option<Bar>> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let close_raw = field(self.close);
        if is_missing(close_raw) {
            return Ok(None);
        }

        let timestamp = parse_timestamp(field(self.timestamp)).ok_or_else(|| DataError::Parse {
            line,
            message: format!("invalid timestamp '{}'", field(self.timestamp)),
        })?;
        let close = parse_price(close_raw).ok_or_else(|| DataError::Parse {
            line,
            message: format!("invalid close '{}'", close_raw),
        })?;

        let optional = |idx: Option<usize>, name: &str| -> Result<_> {
            match idx.map(field) {
                Some(raw) if !is_missing(raw) => {
                    parse_price(raw).ok_or_else(|| DataError::Parse {
                        line,
                        message: format!("invalid {} '{}'", name, raw),
                    })
                }
                _ => Ok(close),
            }
        };

        Ok(Some(Bar::new(
            timestamp,
            optional(self.open, "open")?,
            optional(self.high, "high")?,
            optional(self.low, "low")?,
            close,
        )))
    }
}

/// CSV 파일 기반 시계열 제공자.
#[derive(Debug, Clone)]
pub struct CsvSeriesSource {
    dir: PathBuf,
    file: Option<PathBuf>,
}

impl CsvSeriesSource {
    /// 디렉터리에서 심볼별 파일을 읽는 제공자를 생성합니다.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file: None,
        }
    }

    /// 항상 지정된 파일을 읽는 제공자를 생성합니다.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let file = path.into();
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            dir,
            file: Some(file),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 요청에 해당하는 파일 경로.
    pub fn path_for(&self, request: &SeriesRequest) -> PathBuf {
        if let Some(file) = &self.file {
            return file.clone();
        }
        match request.interval {
            Interval::D1 => self.dir.join(format!("{}.csv", request.symbol)),
            interval => self
                .dir
                .join(format!("{}_{}.csv", request.symbol, interval.as_str())),
        }
    }

    /// CSV 파일에서 봉을 읽어 시각 오름차순으로 반환합니다.
    ///
    /// 기간 제한은 적용하지 않습니다.
    pub fn read_bars(path: &Path) -> Result<Vec<Bar>> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers = reader.headers()?.clone();
        let layout = ColumnLayout::resolve(&headers)?;
        if layout.adjusted_close {
            debug!(path = %path.display(), "Close column missing, using Adj Close");
        }

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        let mut in_data = false;

        for result in reader.records() {
            let record = result?;
            if !in_data && layout.is_header_row(&record) {
                continue;
            }
            in_data = true;

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match layout.parse_record(&record, line)? {
                Some(bar) => bars.push(bar),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(path = %path.display(), skipped, "Skipped rows with missing close");
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

impl SeriesSource for CsvSeriesSource {
    type Error = DataError;

    fn load(&self, request: &SeriesRequest) -> Result<PriceSeries> {
        let path = self.path_for(request);
        if !path.is_file() {
            return Err(DataError::NotFound(format!(
                "{} ({})",
                request.symbol,
                path.display()
            )));
        }

        let bars = Self::read_bars(&path)?;
        let Some(last) = bars.last().map(|b| b.timestamp) else {
            return Err(DataError::InvalidData(format!(
                "{} contains no bars",
                path.display()
            )));
        };

        let series = PriceSeries::new(request.symbol.clone(), bars)?;
        let series = match request.period.cutoff(last) {
            Some(cutoff) => series.since(cutoff),
            None => series,
        };

        info!(
            symbol = %request.symbol,
            period = %request.period,
            interval = %request.interval,
            bars = series.len(),
            "Series loaded"
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn test_layout_prefers_close() {
        let layout =
            ColumnLayout::resolve(&headers(&["Date", "Open", "High", "Low", "Close", "Adj Close"]))
                .unwrap();
        assert_eq!(layout.timestamp, 0);
        assert_eq!(layout.close, 4);
        assert!(!layout.adjusted_close);
    }

    #[test]
    fn test_layout_falls_back_to_adj_close() {
        let layout = ColumnLayout::resolve(&headers(&["Datetime", "Adj Close", "Volume"])).unwrap();
        assert_eq!(layout.close, 1);
        assert!(layout.adjusted_close);
        assert_eq!(layout.open, None);
    }

    #[test]
    fn test_layout_unnamed_index_column() {
        let layout = ColumnLayout::resolve(&headers(&["", "close"])).unwrap();
        assert_eq!(layout.timestamp, 0);
        assert_eq!(layout.close, 1);
    }

    #[test]
    fn test_layout_missing_columns() {
        assert!(matches!(
            ColumnLayout::resolve(&headers(&["Date", "Open"])),
            Err(DataError::MissingColumn(c)) if c == "Close"
        ));
        assert!(matches!(
            ColumnLayout::resolve(&headers(&["Ticker", "Close"])),
            Err(DataError::MissingColumn(c)) if c == "Datetime"
        ));
    }

    #[test]
    fn test_layout_multi_level_header() {
        let layout =
            ColumnLayout::resolve(&headers(&["Price", "Close", "High", "Low", "Open", "Volume"]))
                .unwrap();
        assert_eq!(layout.timestamp, 0);
        assert_eq!(layout.close, 1);
        assert_eq!(layout.open, Some(4));

        assert!(layout.is_header_row(&headers(&["Ticker", "SPY", "SPY", "SPY", "SPY", "SPY"])));
        assert!(layout.is_header_row(&headers(&["Date", "", "", "", "", ""])));
        assert!(!layout.is_header_row(&headers(&["2024-01-02", "472.6", "", "", "", ""])));
    }

    #[test]
    fn test_path_for_interval() {
        let source = CsvSeriesSource::new("data");
        let daily = SeriesRequest::new("SPY");
        let hourly = SeriesRequest::new("SPY").with_interval(Interval::H1);

        assert_eq!(source.path_for(&daily), PathBuf::from("data/SPY.csv"));
        assert_eq!(source.path_for(&hourly), PathBuf::from("data/SPY_1h.csv"));

        let fixed = CsvSeriesSource::from_file("exports/eurusd.csv");
        assert_eq!(fixed.path_for(&hourly), PathBuf::from("exports/eurusd.csv"));
        assert_eq!(fixed.dir(), Path::new("exports"));
    }
}
