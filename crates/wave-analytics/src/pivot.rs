//! 편차 임계값 기반 피봇(스윙) 추출.
//!
//! 가격이 직전 추세의 반대 방향으로 `deviation` 이상 움직였을 때 이전 극값을
//! 피봇으로 확정하고, 연속된 피봇 사이를 파동(레그)으로 나눕니다.
//!
//! # 상태 기계
//!
//! | 상태        | 조건                          | 전이                                     |
//! |-------------|-------------------------------|------------------------------------------|
//! | `Seeking`   | `change > deviation`          | `Uptrend`, 기준가 = 종가 (피봇 없음)      |
//! | `Seeking`   | `change < -deviation`         | `Downtrend`, 기준가 = 종가 (피봇 없음)    |
//! | `Uptrend`   | `close > anchor`              | 기준가 추적 (anchor = close)              |
//! | `Uptrend`   | `change < -deviation`         | 직전 봉에 `High` 확정, `Downtrend`, 기준가 재설정 |
//! | `Downtrend` | `close < anchor`              | 기준가 추적                               |
//! | `Downtrend` | `change > deviation`          | 직전 봉에 `Low` 확정, `Uptrend`, 기준가 재설정 |
//!
//! `change = (close - anchor) / anchor`는 항상 *현재* 기준가에서 측정합니다.
//!
//! 반전 피봇은 임계값을 돌파한 봉이 아니라 그 직전 봉의 시각에, 추적 중이던
//! 기준가로 기록됩니다. 변동이 큰 여러 봉에 걸친 반전에서는 실제 극값 시각과
//! 한 봉 이상 어긋날 수 있는 근사입니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use wave_analytics::pivot::PivotExtractor;
//! use rust_decimal_macros::dec;
//!
//! let extractor = PivotExtractor::new(dec!(0.012))?;
//! let analysis = extractor.extract(series.bars())?;
//!
//! for wave in &analysis.waves {
//!     println!("{} {:+.2}%", wave.direction, wave.pct_change);
//! }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wave_core::{
    AnalysisError, AnalysisResult, Bar, DecimalExt, Fraction, Pivot, PivotKind, Price, Wave,
};

/// 피봇 추출에 필요한 최소 봉 개수.
pub const MIN_BARS: usize = 2;

/// 추세 추적 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    /// 아직 방향이 정해지지 않음
    Seeking,
    /// 상승 추세 - 기준가는 고점을 추적
    Uptrend,
    /// 하락 추세 - 기준가는 저점을 추적
    Downtrend,
}

/// 한 봉에 대한 상태 전이 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 변화 없음
    Hold,
    /// 같은 추세 내에서 기준가를 현재 종가로 갱신 (스윙 연장)
    Trail,
    /// `Seeking`에서 추세 진입. 기준가는 현재 종가 (잠정, 피봇 없음)
    Enter(TrendState),
    /// 반전 확정. 직전 봉 위치에 `confirmed` 피봇을 기록하고
    /// `next` 상태로 전환하며 기준가를 현재 종가로 재설정
    Reverse {
        confirmed: PivotKind,
        next: TrendState,
    },
}

impl TrendState {
    /// 현재 기준가와 종가로 다음 전이를 결정합니다.
    ///
    /// 기준가가 0이면 변화율을 정의할 수 없으므로 `Hold`. 변화율이 `Decimal`
    /// 범위를 넘으면 해당 방향의 극값으로 취급합니다.
    pub fn step(self, anchor: Price, close: Price, deviation: Fraction) -> Transition {
        let change = match anchor.fraction_change_to(close) {
            Some(change) => change,
            None if anchor.is_zero() => return Transition::Hold,
            None if close > anchor => Decimal::MAX,
            None => Decimal::MIN,
        };

        match self {
            TrendState::Seeking => {
                if change > deviation {
                    Transition::Enter(TrendState::Uptrend)
                } else if change < -deviation {
                    Transition::Enter(TrendState::Downtrend)
                } else {
                    Transition::Hold
                }
            }
            TrendState::Uptrend => {
                if close > anchor {
                    Transition::Trail
                } else if change < -deviation {
                    Transition::Reverse {
                        confirmed: PivotKind::High,
                        next: TrendState::Downtrend,
                    }
                } else {
                    Transition::Hold
                }
            }
            TrendState::Downtrend => {
                if close < anchor {
                    Transition::Trail
                } else if change > deviation {
                    Transition::Reverse {
                        confirmed: PivotKind::Low,
                        next: TrendState::Uptrend,
                    }
                } else {
                    Transition::Hold
                }
            }
        }
    }
}

/// 피봇 추출 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingAnalysis {
    /// `Start`로 시작하고 `Current`로 끝나는 피봇 목록
    pub pivots: Vec<Pivot>,
    /// 연속된 피봇 쌍으로부터 만든 파동 (`pivots.len() - 1`개)
    pub waves: Vec<Wave>,
    /// 마지막 봉 처리 후의 추세 상태
    pub final_state: TrendState,
}

impl SwingAnalysis {
    /// 확정된 극값(High/Low) 피봇 개수.
    pub fn confirmed_pivot_count(&self) -> usize {
        self.pivots.iter().filter(|p| p.is_extremum()).count()
    }
}

/// 편차 임계값 기반 피봇 추출기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotExtractor {
    deviation: Fraction,
}

impl PivotExtractor {
    /// 새 추출기를 생성합니다.
    ///
    /// # 인자
    ///
    /// * `deviation` - 반전 확정 임계값 (비율, 0.012 = 1.2%)
    ///
    /// # 에러
    ///
    /// `deviation <= 0`이면 `InvalidParameter`. 0은 모든 방향 전환을 피봇으로
    /// 만드는 퇴화된 설정입니다.
    pub fn new(deviation: Fraction) -> AnalysisResult<Self> {
        if deviation <= Decimal::ZERO {
            return Err(AnalysisError::invalid(format!(
                "deviation must be > 0, got {}",
                deviation
            )));
        }
        Ok(Self { deviation })
    }

    /// 임계값.
    pub fn deviation(&self) -> Fraction {
        self.deviation
    }

    /// 봉 시계열에서 피봇과 파동을 추출합니다.
    ///
    /// # 에러
    ///
    /// - 봉이 2개 미만: `InsufficientData`
    /// - 종가가 0 이하인 봉 존재: `InvalidSeries`
    pub fn extract(&self, bars: &[Bar]) -> AnalysisResult<SwingAnalysis> {
        if bars.len() < MIN_BARS {
            return Err(AnalysisError::InsufficientData {
                required: MIN_BARS,
                provided: bars.len(),
            });
        }
        if let Some(bar) = bars.iter().find(|b| b.close <= Decimal::ZERO) {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-positive close {} at {}",
                bar.close, bar.timestamp
            )));
        }

        let first = &bars[0];
        let last = &bars[bars.len() - 1];

        let mut pivots = vec![Pivot::new(first.timestamp, first.close, PivotKind::Start)];
        let mut state = TrendState::Seeking;
        let mut anchor = first.close;

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);

            match state.step(anchor, bar.close, self.deviation) {
                Transition::Hold => {}
                Transition::Trail => anchor = bar.close,
                Transition::Enter(next) => {
                    state = next;
                    anchor = bar.close;
                }
                Transition::Reverse { confirmed, next } => {
                    pivots.push(Pivot::new(prev.timestamp, anchor, confirmed));
                    state = next;
                    anchor = bar.close;
                }
            }
        }

        pivots.push(Pivot::new(last.timestamp, last.close, PivotKind::Current));

        let waves = build_waves(&pivots)?;

        debug!(
            bars = bars.len(),
            deviation = %self.deviation,
            pivots = pivots.len(),
            waves = waves.len(),
            final_state = ?state,
            "Swing extraction complete"
        );

        Ok(SwingAnalysis {
            pivots,
            waves,
            final_state: state,
        })
    }
}

/// 연속된 피봇 쌍으로 파동을 만듭니다.
///
/// # 에러
///
/// 변화율을 계산할 수 없는 쌍(기준가 0, `Decimal` 범위 초과)이 있으면 `InvalidSeries`.
pub fn build_waves(pivots: &[Pivot]) -> AnalysisResult<Vec<Wave>> {
    pivots
        .windows(2)
        .map(|w| {
            Wave::between(&w[0], &w[1]).ok_or_else(|| {
                AnalysisError::InvalidSeries(format!(
                    "price change from {} to {} is out of range",
                    w[0].price, w[1].price
                ))
            })
        })
        .collect()
}

/// 피봇과 파동을 추출합니다.
///
/// `PivotExtractor::new(deviation)?.extract(bars)`의 축약형입니다.
pub fn extract(bars: &[Bar], deviation: Fraction) -> AnalysisResult<(Vec<Pivot>, Vec<Wave>)> {
    let analysis = PivotExtractor::new(deviation)?.extract(bars)?;
    Ok((analysis.pivots, analysis.waves))
}
