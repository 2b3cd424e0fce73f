//! 변동성 기반 편차 임계값 추천.
//!
//! 최근 `lookback_days`일 동안의 봉 간 평균 절대 변화율에 노이즈 제거 계수
//! (3.0)를 곱해 피봇 추출기의 `deviation` 기본값을 제안합니다. 종목과 시장
//! 국면마다 자연스러운 스윙 크기가 다르기 때문입니다.

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wave_core::{AnalysisError, AnalysisResult, Bar, DecimalExt, Fraction, Percentage};

/// 평균 변동폭에 곱하는 노이즈 제거 계수.
pub const NOISE_REJECTION_FACTOR: Decimal = dec!(3.0);

/// 민감도 추천 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySuggestion {
    /// 추천 임계값 (%, 소수 둘째 자리 반올림)
    pub deviation_pct: Percentage,
    /// 평균 절대 변화율 (%)
    pub mean_abs_change_pct: Percentage,
    /// 측정에 사용된 봉 개수
    pub window_bars: usize,
}

impl SensitivitySuggestion {
    fn empty(window_bars: usize) -> Self {
        Self {
            deviation_pct: Decimal::ZERO,
            mean_abs_change_pct: Decimal::ZERO,
            window_bars,
        }
    }

    /// 추천 임계값을 피봇 추출기가 사용하는 비율로 변환합니다.
    pub fn suggested_fraction(&self) -> Fraction {
        self.deviation_pct / Decimal::ONE_HUNDRED
    }

    /// 측정 구간이 비어 있어 추천값이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.deviation_pct.is_zero()
    }
}

/// 변동성 기반 민감도 추정기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitivityEstimator {
    lookback_days: u32,
}

impl SensitivityEstimator {
    /// 새 추정기를 생성합니다.
    ///
    /// # 에러
    ///
    /// `lookback_days`가 0이면 `InvalidParameter`.
    pub fn new(lookback_days: u32) -> AnalysisResult<Self> {
        if lookback_days == 0 {
            return Err(AnalysisError::invalid("lookback_days must be at least 1"));
        }
        Ok(Self { lookback_days })
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// 임계값을 추천합니다.
    ///
    /// 마지막 봉으로부터 `lookback_days`일 이내의 봉만 사용합니다. 구간이 비어
    /// 있거나 변화율을 하나도 만들 수 없으면 0을 반환합니다.
    pub fn suggest(&self, bars: &[Bar]) -> SensitivitySuggestion {
        let Some(last) = bars.last() else {
            return SensitivitySuggestion::empty(0);
        };

        // 날짜 범위를 벗어나는 기간이면 전체 시계열 사용
        let start = Duration::try_days(i64::from(self.lookback_days))
            .and_then(|days| last.timestamp.checked_sub_signed(days))
            .map_or(0, |cutoff| bars.partition_point(|b| b.timestamp < cutoff));
        let window = &bars[start..];

        let changes: Vec<Decimal> = window
            .windows(2)
            .filter_map(|w| w[0].close.pct_change_to(w[1].close))
            .map(|pct| pct.abs())
            .collect();

        if changes.is_empty() {
            return SensitivitySuggestion::empty(window.len());
        }

        let mean = changes.iter().sum::<Decimal>() / Decimal::from(changes.len());
        let deviation_pct = (mean * NOISE_REJECTION_FACTOR).round_dp(2);

        debug!(
            lookback_days = self.lookback_days,
            window_bars = window.len(),
            mean_abs_change_pct = %mean.round_dp(4),
            deviation_pct = %deviation_pct,
            "Deviation suggested"
        );

        SensitivitySuggestion {
            deviation_pct,
            mean_abs_change_pct: mean,
            window_bars: window.len(),
        }
    }
}

/// 추천 임계값(%)을 반환합니다.
///
/// `SensitivityEstimator::new(lookback_days)?.suggest(bars).deviation_pct`의 축약형입니다.
pub fn suggest_deviation(bars: &[Bar], lookback_days: u32) -> AnalysisResult<Percentage> {
    Ok(SensitivityEstimator::new(lookback_days)?
        .suggest(bars)
        .deviation_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn bars(closes: &[Decimal]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::from_close(day(i as i64), *c))
            .collect()
    }

    #[test]
    fn test_suggest_alternating_moves() {
        // 매 봉 ±1% 근처 변동
        let series = bars(&[dec!(100), dec!(101), dec!(100), dec!(101), dec!(100)]);
        let suggestion = SensitivityEstimator::new(30).unwrap().suggest(&series);

        // |1%|, |-0.990099%|, |1%|, |-0.990099%| 평균 = 0.9950495%, × 3 = 2.985%
        assert_eq!(suggestion.deviation_pct, dec!(2.99));
        assert_eq!(suggestion.window_bars, 5);
        assert_eq!(suggestion.suggested_fraction(), dec!(0.0299));
    }

    #[test]
    fn test_lookback_restricts_window() {
        // 앞부분의 큰 변동은 lookback 밖
        let series = bars(&[
            dec!(100),
            dec!(150),
            dec!(100),
            dec!(100),
            dec!(102),
            dec!(100),
        ]);
        // 마지막 봉(day 5) 기준 2일 이내: day 3, 4, 5
        let suggestion = SensitivityEstimator::new(2).unwrap().suggest(&series);
        assert_eq!(suggestion.window_bars, 3);

        let all = SensitivityEstimator::new(365).unwrap().suggest(&series);
        assert!(all.deviation_pct > suggestion.deviation_pct);
    }

    #[test]
    fn test_empty_and_single_bar_fail_softly() {
        assert_eq!(suggest_deviation(&[], 10).unwrap(), Decimal::ZERO);
        assert_eq!(suggest_deviation(&bars(&[dec!(100)]), 10).unwrap(), Decimal::ZERO);
        assert!(SensitivityEstimator::new(10).unwrap().suggest(&[]).is_empty());
    }

    #[test]
    fn test_huge_lookback_uses_whole_series() {
        let series = bars(&[dec!(100), dec!(101), dec!(102)]);
        let suggestion = SensitivityEstimator::new(u32::MAX).unwrap().suggest(&series);
        assert_eq!(suggestion.window_bars, 3);
        assert!(suggest_deviation(&series, u32::MAX).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_rejects_zero_lookback() {
        assert!(matches!(
            suggest_deviation(&bars(&[dec!(100), dec!(101)]), 0),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
