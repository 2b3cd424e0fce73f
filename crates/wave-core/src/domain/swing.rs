//! 스윙(파동) 분석 결과 타입.
//!
//! - `Pivot` - 확정된 고점/저점 (및 시작/현재 지점)
//! - `Wave` - 연속된 두 피봇 사이의 가격 이동 구간

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{DecimalExt, Percentage, Price};

/// 피봇 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    /// 시계열의 첫 봉 (항상 인덱스 0)
    Start,
    /// 확정된 고점
    High,
    /// 확정된 저점
    Low,
    /// 마지막 봉. 아직 확정되지 않은 진행 중인 스윙
    Current,
}

impl fmt::Display for PivotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PivotKind::Start => write!(f, "Start"),
            PivotKind::High => write!(f, "High"),
            PivotKind::Low => write!(f, "Low"),
            PivotKind::Current => write!(f, "Current"),
        }
    }
}

/// 피봇 지점.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pivot {
    /// 피봇 시각
    pub timestamp: DateTime<Utc>,
    /// 피봇 가격
    pub price: Price,
    /// 피봇 유형
    pub kind: PivotKind,
}

impl Pivot {
    pub fn new(timestamp: DateTime<Utc>, price: Price, kind: PivotKind) -> Self {
        Self {
            timestamp,
            price,
            kind,
        }
    }

    /// 확정된 극값(High/Low)인지 확인합니다.
    pub fn is_extremum(&self) -> bool {
        matches!(self.kind, PivotKind::High | PivotKind::Low)
    }
}

/// 파동 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveDirection {
    /// 상승
    Up,
    /// 하락 (변화율 0 포함)
    Down,
}

impl WaveDirection {
    /// 변화율로부터 방향을 결정합니다. 0%는 하락으로 분류합니다.
    pub fn from_change(pct_change: Percentage) -> Self {
        if pct_change > Decimal::ZERO {
            WaveDirection::Up
        } else {
            WaveDirection::Down
        }
    }
}

impl fmt::Display for WaveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveDirection::Up => write!(f, "Up"),
            WaveDirection::Down => write!(f, "Down"),
        }
    }
}

/// 두 피봇 사이의 파동(레그).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// 시작 시각
    pub start_timestamp: DateTime<Utc>,
    /// 종료 시각
    pub end_timestamp: DateTime<Utc>,
    /// 시작 가격
    pub start_price: Price,
    /// 종료 가격
    pub end_price: Price,
    /// 변화율 (%)
    pub pct_change: Percentage,
    /// 방향
    pub direction: WaveDirection,
}

impl Wave {
    /// 연속된 두 피봇으로부터 파동을 생성합니다.
    ///
    /// 시작 가격이 0이면 변화율을 정의할 수 없으므로 `None`을 반환합니다.
    pub fn between(start: &Pivot, end: &Pivot) -> Option<Self> {
        let pct_change = start.price.pct_change_to(end.price)?;
        Some(Self {
            start_timestamp: start.timestamp,
            end_timestamp: end.timestamp,
            start_price: start.price,
            end_price: end.price,
            pct_change,
            direction: WaveDirection::from_change(pct_change),
        })
    }

    /// 변화율의 절대값 (%).
    pub fn abs_change(&self) -> Percentage {
        self.pct_change.abs()
    }

    pub fn is_up(&self) -> bool {
        self.direction == WaveDirection::Up
    }
}
