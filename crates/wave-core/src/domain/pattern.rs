//! 패턴 유사도 스캔 결과 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Bar;

/// 사용자가 선택한 기준 구간.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    /// 구간 시작 (첫 봉의 시각)
    pub start_timestamp: DateTime<Utc>,
    /// 구간 종료 (마지막 봉의 시각)
    pub end_timestamp: DateTime<Utc>,
    /// 구간에 포함된 봉
    pub bars: Vec<Bar>,
    /// 첫 종가 대비 변화율로 정규화한 곡선
    pub normalized_curve: Vec<f64>,
}

impl ReferenceWindow {
    /// 구간의 봉 개수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// 과거 유사 구간 후보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// 시계열 내 시작 인덱스
    pub start_index: usize,
    /// 후보 구간 시작 시각
    pub start_timestamp: DateTime<Utc>,
    /// 후보 구간 종료 시각
    pub end_timestamp: DateTime<Utc>,
    /// 유사도 점수 (Pearson 상관계수 × 100, -100 ~ 100)
    pub score: f64,
    /// 정규화된 후보 곡선
    pub normalized_curve: Vec<f64>,
    /// 구간 종료 후 N봉 뒤의 수익률 (%). 이후 데이터가 부족하면 `None`
    pub forward_return: Option<f64>,
}

/// 상위 매치들의 결과 요약.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// 결과가 존재하는 매치 수
    pub matches_with_outcome: usize,
    /// 평균 forward return (%)
    pub mean_forward_return: Option<f64>,
    /// forward return이 양수인 매치 비율 (0.0 ~ 1.0)
    pub positive_ratio: Option<f64>,
}

impl MatchSummary {
    /// 매치 목록으로부터 요약을 계산합니다.
    pub fn from_matches(matches: &[MatchCandidate]) -> Self {
        let outcomes: Vec<f64> = matches.iter().filter_map(|m| m.forward_return).collect();
        if outcomes.is_empty() {
            return Self::default();
        }

        let n = outcomes.len() as f64;
        let positive = outcomes.iter().filter(|r| **r > 0.0).count() as f64;

        Self {
            matches_with_outcome: outcomes.len(),
            mean_forward_return: Some(outcomes.iter().sum::<f64>() / n),
            positive_ratio: Some(positive / n),
        }
    }
}

/// 패턴 스캔 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// 기준 구간
    pub reference: ReferenceWindow,
    /// 점수 내림차순으로 정렬된 상위 매치
    pub matches: Vec<MatchCandidate>,
    /// 상관계수를 계산한 후보 수
    pub candidates_evaluated: usize,
    /// 정규화 불가 또는 분산 0으로 건너뛴 후보 수
    pub candidates_skipped: usize,
    /// 매치 결과 요약
    pub summary: MatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(forward_return: Option<f64>) -> MatchCandidate {
        let t = Utc::now();
        MatchCandidate {
            start_index: 0,
            start_timestamp: t,
            end_timestamp: t,
            score: 90.0,
            normalized_curve: vec![0.0, 0.01],
            forward_return,
        }
    }

    #[test]
    fn test_summary_ignores_unavailable() {
        let matches = vec![candidate(Some(2.0)), candidate(None), candidate(Some(-1.0))];
        let summary = MatchSummary::from_matches(&matches);

        assert_eq!(summary.matches_with_outcome, 2);
        assert_eq!(summary.mean_forward_return, Some(0.5));
        assert_eq!(summary.positive_ratio, Some(0.5));
    }

    #[test]
    fn test_summary_empty() {
        let summary = MatchSummary::from_matches(&[candidate(None)]);
        assert_eq!(summary, MatchSummary::default());
    }
}
