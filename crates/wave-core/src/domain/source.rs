//! 가격 시계열 제공자 추상화.
//!
//! 분석 엔진은 데이터 수집 방식(다운로드, 파일, 캐시)을 알지 못합니다.
//! 매 호출마다 새로 제공된 시계열을 불변 입력으로만 다룹니다.

use serde::{Deserialize, Serialize};

use super::PriceSeries;
use crate::types::{Interval, Period};

/// 시계열 요청 `(symbol, period, interval)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRequest {
    /// 종목 심볼 (예: EURUSD=X, SPY)
    pub symbol: String,
    /// 조회 기간
    pub period: Period,
    /// 봉 간격
    pub interval: Interval,
}

impl SeriesRequest {
    /// 일봉 1년 요청을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: Period::default(),
            interval: Interval::default(),
        }
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }
}

/// 가격 시계열 제공자 trait.
///
/// 구현체는 타임스탬프 오름차순이고 종가(close)가 채워진 시계열을
/// 반환해야 합니다. 수정 종가만 있는 경우의 변환은 구현체의 책임입니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct YahooSource {
///     client: reqwest::blocking::Client,
/// }
///
/// impl SeriesSource for YahooSource {
///     type Error = YahooError;
///
///     fn load(&self, request: &SeriesRequest) -> Result<PriceSeries, Self::Error> {
///         // 다운로드 및 변환
///     }
/// }
/// ```
pub trait SeriesSource {
    /// 제공자 에러 타입.
    type Error: std::error::Error + Send + Sync + 'static;

    /// 요청에 해당하는 시계열을 읽어옵니다.
    fn load(&self, request: &SeriesRequest) -> Result<PriceSeries, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = SeriesRequest::new("EURUSD=X")
            .with_period(Period::FiveYears)
            .with_interval(Interval::H1);

        assert_eq!(req.symbol, "EURUSD=X");
        assert_eq!(req.period, Period::FiveYears);
        assert_eq!(req.interval, Interval::H1);
    }
}
