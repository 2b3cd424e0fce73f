//! 가격 봉 및 시계열.
//!
//! - `Bar` - OHLC 가격 봉
//! - `PriceSeries` - 타임스탬프가 엄격히 증가하는 봉 시계열

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::Price;

/// OHLC 가격 봉.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// 봉 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
}

impl Bar {
    /// 새 봉을 생성합니다.
    pub fn new(timestamp: DateTime<Utc>, open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// 종가만으로 봉을 생성합니다 (시가/고가/저가 = 종가).
    pub fn from_close(timestamp: DateTime<Utc>, close: Price) -> Self {
        Self::new(timestamp, close, close, close, close)
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 봉 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Price {
        self.high - self.low
    }
}

/// 검증된 가격 시계열.
///
/// 타임스탬프는 엄격히 증가하며 중복이 없습니다. 한 번 생성되면 분석 중에는
/// 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// 봉 목록으로 시계열을 생성합니다.
    ///
    /// # Errors
    ///
    /// 타임스탬프가 증가 순서가 아니거나 중복되면 `InvalidSeries`.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> AnalysisResult<Self> {
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AnalysisError::InvalidSeries(format!(
                "timestamps must be strictly increasing: {} is followed by {}",
                bars[pos].timestamp,
                bars[pos + 1].timestamp
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// 심볼을 반환합니다.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 봉 슬라이스를 반환합니다.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// 첫 봉.
    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// 마지막 봉.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// `since` 이후(포함)의 봉만 남긴 새 시계열을 반환합니다.
    pub fn since(&self, since: DateTime<Utc>) -> Self {
        let start = self.bars.partition_point(|b| b.timestamp < since);
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    /// `[start, end]` 구간에 포함되는 봉 슬라이스를 반환합니다.
    pub fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[Bar] {
        let from = self.bars.partition_point(|b| b.timestamp < start);
        let to = self.bars.partition_point(|b| b.timestamp <= end);
        if from >= to {
            &[]
        } else {
            &self.bars[from..to]
        }
    }

    /// 내부 봉 벡터를 반환하며 시계열을 소비합니다.
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

impl Deref for PriceSeries {
    type Target = [Bar];

    fn deref(&self) -> &Self::Target {
        &self.bars
    }
}

impl AsRef<[Bar]> for PriceSeries {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_series_rejects_unordered() {
        let bars = vec![
            Bar::from_close(day(1), dec!(100)),
            Bar::from_close(day(0), dec!(101)),
        ];
        let err = PriceSeries::new("TEST", bars).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSeries(_)));
    }

    #[test]
    fn test_series_rejects_duplicates() {
        let bars = vec![
            Bar::from_close(day(1), dec!(100)),
            Bar::from_close(day(1), dec!(101)),
        ];
        assert!(PriceSeries::new("TEST", bars).is_err());
    }

    #[test]
    fn test_series_range_and_since() {
        let bars: Vec<Bar> = (0..10).map(|i| Bar::from_close(day(i), dec!(100))).collect();
        let series = PriceSeries::new("TEST", bars).unwrap();

        assert_eq!(series.range(day(2), day(5)).len(), 4);
        assert_eq!(series.range(day(20), day(30)).len(), 0);
        assert_eq!(series.since(day(7)).len(), 3);
        assert_eq!(series.symbol(), "TEST");
    }

    #[test]
    fn test_bar() {
        let bar = Bar::new(day(0), dec!(100), dec!(105), dec!(99), dec!(104));
        assert!(bar.is_bullish());
        assert_eq!(bar.range(), dec!(6));
    }
}
