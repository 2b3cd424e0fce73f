//! 과거 유사 패턴 스캐너.
//!
//! 사용자가 선택한 기준 구간과 정규화된 가격 형태가 가장 비슷한 과거 구간을
//! 찾고, 각 구간 이후 실제로 어떤 결과가 나왔는지 함께 반환합니다.
//!
//! # 알고리즘
//!
//! 1. 기준 구간 종가를 첫 종가 대비 변화율로 정규화 (길이 `L`)
//! 2. 기준 구간 시작 이전의 봉 전체를 탐색 공간으로 사용
//! 3. 길이 `L` 창을 `stride` 간격으로 이동하며 동일하게 정규화
//! 4. 기준 곡선과의 Pearson 상관계수 × 100을 점수로 사용
//! 5. 후보 구간 종료 후 `forward_bars`봉 뒤의 수익률을 결과로 기록
//! 6. 점수 내림차순 안정 정렬 후 상위 `top_n`개 반환 (동점은 이른 시각 우선)
//!
//! 정규화 곡선의 상관계수는 가격 수준과 변동성 규모에 무관하게 *형태*만
//! 비교합니다.
//!
//! # 속도와 재현율
//!
//! 탐색은 O(n·L)입니다. 기본 `stride = 5`는 후보 수를 1/5로 줄이는 대신
//! 사이 위치의 후보는 평가하지 않습니다. `ScanMode::Exhaustive`는 모든
//! 시작 위치를 평가합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use wave_analytics::similarity::PatternScanner;
//! use wave_core::ScanConfig;
//!
//! let scanner = PatternScanner::new(ScanConfig::default().with_top_n(5));
//! let report = scanner.scan(series.bars(), ref_start, ref_end)?;
//!
//! for m in &report.matches {
//!     println!("{} score={:.1} fwd={:?}", m.start_timestamp, m.score, m.forward_return);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};
use wave_core::{
    AnalysisError, AnalysisResult, Bar, DecimalExt, MatchCandidate, MatchSummary,
    ReferenceWindow, ScanConfig, ScanReport,
};

use crate::correlation::{calculate_correlation, normalize_to_first, pct_change};

/// 기준 구간의 최소 봉 개수.
pub const MIN_REFERENCE_BARS: usize = 5;

/// 스캔 진행 상황.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    /// 처리한 후보 구간 수
    pub processed: usize,
    /// 전체 후보 구간 수
    pub total: usize,
}

impl ScanProgress {
    /// 진행률 (0.0 ~ 1.0).
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// 스캔 진행 상황 관찰자.
///
/// `progress_interval`개 후보마다, 그리고 스캔 종료 시 한 번 호출됩니다.
/// `ControlFlow::Break`를 반환하면 다음 후보로 넘어가기 전에 스캔을 중단하고
/// `AnalysisError::Cancelled`로 실패합니다. 관찰자에서 발생한 panic은
/// 기록만 하고 스캔을 계속합니다.
pub trait ScanObserver {
    fn on_progress(&mut self, progress: &ScanProgress) -> ControlFlow<()>;
}

impl<F> ScanObserver for F
where
    F: FnMut(&ScanProgress) -> ControlFlow<()>,
{
    fn on_progress(&mut self, progress: &ScanProgress) -> ControlFlow<()> {
        self(progress)
    }
}

/// 아무것도 하지 않는 관찰자.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_progress(&mut self, _progress: &ScanProgress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// 관찰자를 호출합니다. panic은 삼키고 계속 진행합니다.
fn notify(observer: &mut dyn ScanObserver, progress: &ScanProgress) -> ControlFlow<()> {
    match catch_unwind(AssertUnwindSafe(|| observer.on_progress(progress))) {
        Ok(flow) => flow,
        Err(_) => {
            warn!(
                processed = progress.processed,
                total = progress.total,
                "Scan observer panicked, continuing scan"
            );
            ControlFlow::Continue(())
        }
    }
}

/// 점수가 계산된 후보 (곡선은 상위 후보에 대해서만 만듦).
#[derive(Debug, Clone, Copy)]
struct ScoredWindow {
    start: usize,
    score: f64,
}

/// 과거 유사 패턴 스캐너.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternScanner {
    config: ScanConfig,
}

impl PatternScanner {
    /// 새 스캐너를 생성합니다.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 진행 상황 보고 없이 스캔합니다.
    pub fn scan(
        &self,
        bars: &[Bar],
        ref_start: DateTime<Utc>,
        ref_end: DateTime<Utc>,
    ) -> AnalysisResult<ScanReport> {
        self.scan_with_observer(bars, ref_start, ref_end, &mut NoopObserver)
    }

    /// 기준 구간 `[ref_start, ref_end]`와 유사한 과거 구간을 찾습니다.
    ///
    /// `bars`는 타임스탬프 오름차순이어야 합니다 (`PriceSeries` 보장).
    ///
    /// # 에러
    ///
    /// - `InvalidParameter`: `top_n = 0`, `stride = 0`, `forward_bars = 0`,
    ///   `ref_start >= ref_end`
    /// - `ReferenceTooShort`: 기준 구간 봉이 5개 미만
    /// - `InsufficientHistory`: 기준 구간 이전 봉이 기준 구간 길이보다 적음
    /// - `DegenerateReference`: 기준 구간 첫 종가가 0이거나 정의되지 않음,
    ///   또는 기준 곡선의 분산이 0
    /// - `Cancelled`: 관찰자가 중단을 요청
    pub fn scan_with_observer(
        &self,
        bars: &[Bar],
        ref_start: DateTime<Utc>,
        ref_end: DateTime<Utc>,
        observer: &mut dyn ScanObserver,
    ) -> AnalysisResult<ScanReport> {
        self.config.validate()?;
        if ref_start >= ref_end {
            return Err(AnalysisError::invalid(format!(
                "ref_start ({}) must be before ref_end ({})",
                ref_start, ref_end
            )));
        }

        // 1. 기준 구간
        let ref_from = bars.partition_point(|b| b.timestamp < ref_start);
        let ref_to = bars.partition_point(|b| b.timestamp <= ref_end);
        let reference_bars = &bars[ref_from..ref_to.max(ref_from)];
        let window_len = reference_bars.len();

        if window_len < MIN_REFERENCE_BARS {
            return Err(AnalysisError::ReferenceTooShort {
                required: MIN_REFERENCE_BARS,
                provided: window_len,
            });
        }

        // 2. 탐색 공간: 기준 구간 시작 이전의 봉
        let search_len = ref_from;
        if search_len < window_len {
            return Err(AnalysisError::InsufficientHistory {
                required: window_len,
                available: search_len,
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close.to_f64_lossy()).collect();

        let reference_curve = normalize_to_first(&closes[ref_from..ref_to]).ok_or_else(|| {
            AnalysisError::DegenerateReference(format!(
                "first close {} at {} cannot be used as a base",
                reference_bars[0].close, reference_bars[0].timestamp
            ))
        })?;
        if calculate_correlation(&reference_curve, &reference_curve).is_none() {
            return Err(AnalysisError::DegenerateReference(
                "reference window has no price variation".to_string(),
            ));
        }

        // 3~4. 후보 구간 점수 계산
        let stride = self.config.effective_stride();
        let total = (search_len - window_len) / stride + 1;

        info!(
            reference_bars = window_len,
            search_bars = search_len,
            stride,
            candidates = total,
            "Pattern scan started"
        );

        let mut scored: Vec<ScoredWindow> = Vec::new();
        let mut skipped = 0usize;

        for (processed, start) in (0..=search_len - window_len).step_by(stride).enumerate() {
            let window = &closes[start..start + window_len];

            let score = normalize_to_first(window)
                .and_then(|curve| calculate_correlation(&reference_curve, &curve))
                .map(|corr| (corr * 100.0).clamp(-100.0, 100.0));

            match score {
                Some(score) => scored.push(ScoredWindow { start, score }),
                None => skipped += 1,
            }

            let processed = processed + 1;
            if self.config.progress_interval > 0
                && processed % self.config.progress_interval == 0
                && processed < total
            {
                let progress = ScanProgress { processed, total };
                if notify(observer, &progress).is_break() {
                    info!(processed, total, "Pattern scan cancelled by observer");
                    return Err(AnalysisError::Cancelled);
                }
            }
        }

        // 완료 보고. 이미 끝났으므로 중단 요청은 무시
        let _ = notify(observer, &ScanProgress { processed: total, total });

        // 6. 안정 정렬: 동점은 스캔 순서(이른 시각) 유지
        let evaluated = scored.len();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.config.top_n);

        // 5. 상위 후보만 곡선과 결과를 만듦
        let matches: Vec<MatchCandidate> = scored
            .iter()
            .map(|s| self.build_candidate(bars, &closes, s, window_len))
            .collect();

        let summary = MatchSummary::from_matches(&matches);

        debug!(
            evaluated,
            skipped,
            best_score = matches.first().map(|m| m.score),
            "Pattern scan complete"
        );

        Ok(ScanReport {
            reference: ReferenceWindow {
                start_timestamp: reference_bars[0].timestamp,
                end_timestamp: reference_bars[window_len - 1].timestamp,
                bars: reference_bars.to_vec(),
                normalized_curve: reference_curve,
            },
            matches,
            candidates_evaluated: evaluated,
            candidates_skipped: skipped,
            summary,
        })
    }

    fn build_candidate(
        &self,
        bars: &[Bar],
        closes: &[f64],
        scored: &ScoredWindow,
        window_len: usize,
    ) -> MatchCandidate {
        let start = scored.start;
        let end = start + window_len - 1;

        let forward_return = closes
            .get(end + self.config.forward_bars)
            .and_then(|target| pct_change(closes[end], *target));

        MatchCandidate {
            start_index: start,
            start_timestamp: bars[start].timestamp,
            end_timestamp: bars[end].timestamp,
            score: scored.score,
            normalized_curve: normalize_to_first(&closes[start..=end]).unwrap_or_default(),
            forward_return,
        }
    }
}

/// 기준 구간과 상위 `top_n`개 매치를 반환합니다.
///
/// 기본 설정(stride 5, forward 10봉)에 `top_n`만 바꾼 `PatternScanner`의 축약형입니다.
pub fn find_matches(
    bars: &[Bar],
    ref_start: DateTime<Utc>,
    ref_end: DateTime<Utc>,
    top_n: usize,
) -> AnalysisResult<(ReferenceWindow, Vec<MatchCandidate>)> {
    let report = PatternScanner::new(ScanConfig::default().with_top_n(top_n))
        .scan(bars, ref_start, ref_end)?;
    Ok((report.reference, report.matches))
}
