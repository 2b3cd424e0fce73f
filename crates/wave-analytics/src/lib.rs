//! 파동 분석 및 패턴 스캔 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 편차 임계값 기반 피봇/파동 추출
//! - 최근 변동성 기반 임계값 추천
//! - 정규화 곡선 상관계수 기반 과거 유사 패턴 스캔
//! - 파동 통계
//!
//! 세 분석은 서로 독립적이며 호출 간 상태를 갖지 않습니다.
//!
//! # Re-exports
//!
//! - [`pivot`]: 피봇 추출기 (PivotExtractor, TrendState 등)
//! - [`sensitivity`]: 민감도 추정기 (SensitivityEstimator)
//! - [`similarity`]: 패턴 스캐너 (PatternScanner, ScanObserver 등)

pub mod correlation;
pub mod pivot;
pub mod sensitivity;
pub mod similarity;
pub mod statistics;

// Pivot 모듈 re-exports
pub use pivot::{build_waves, extract, PivotExtractor, SwingAnalysis, Transition, TrendState};

// Sensitivity 모듈 re-exports
pub use sensitivity::{
    suggest_deviation, SensitivityEstimator, SensitivitySuggestion, NOISE_REJECTION_FACTOR,
};

// Similarity 모듈 re-exports
pub use similarity::{
    find_matches, NoopObserver, PatternScanner, ScanObserver, ScanProgress, MIN_REFERENCE_BARS,
};

pub use statistics::{DirectionStats, WaveStatistics};
