//! 파동 통계.
//!
//! 상승/하락 레그의 개수와 평균·최대 변동폭을 집계합니다. 상승 파동이 평균적으로
//! 어디서 소진되는지 가늠하는 기술 통계이며 예측 모델이 아닙니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wave_core::{Percentage, Wave, WaveDirection};

/// 한 방향 레그들의 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionStats {
    /// 레그 개수
    pub count: usize,
    /// 평균 절대 변화율 (%)
    pub mean_abs_pct: Option<Percentage>,
    /// 최대 절대 변화율 (%)
    pub max_abs_pct: Option<Percentage>,
}

impl DirectionStats {
    fn from_changes(changes: impl Iterator<Item = Percentage>) -> Self {
        let mut count = 0usize;
        let mut sum = Decimal::ZERO;
        let mut max: Option<Decimal> = None;

        for change in changes {
            count += 1;
            sum += change;
            max = Some(max.map_or(change, |m| m.max(change)));
        }

        Self {
            count,
            mean_abs_pct: (count > 0).then(|| sum / Decimal::from(count)),
            max_abs_pct: max,
        }
    }
}

/// 상승/하락 파동 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveStatistics {
    /// 상승 레그
    pub up: DirectionStats,
    /// 하락 레그 (0% 레그 포함)
    pub down: DirectionStats,
}

impl WaveStatistics {
    /// 파동 목록으로부터 통계를 계산합니다.
    pub fn from_waves(waves: &[Wave]) -> Self {
        let by_direction = |direction: WaveDirection| {
            DirectionStats::from_changes(
                waves
                    .iter()
                    .filter(move |w| w.direction == direction)
                    .map(Wave::abs_change),
            )
        };

        Self {
            up: by_direction(WaveDirection::Up),
            down: by_direction(WaveDirection::Down),
        }
    }

    /// 전체 레그 개수.
    pub fn total(&self) -> usize {
        self.up.count + self.down.count
    }
}
