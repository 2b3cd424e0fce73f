//! 패턴 스캐너 통합 테스트.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::ops::ControlFlow;

use wave_analytics::{find_matches, PatternScanner, ScanProgress};
use wave_core::{AnalysisError, Bar, PriceSeries, ScanConfig};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 6, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn series_from_cents(cents: &[u32]) -> PriceSeries {
    let bars = cents
        .iter()
        .enumerate()
        .map(|(i, c)| Bar::from_close(day(i as i64), Decimal::new(i64::from(*c), 2)))
        .collect();
    PriceSeries::new("TEST", bars).unwrap()
}

/// 결정적인 의사 난수 가격 (선형 합동 생성기)
fn noisy_cents(n: usize, seed: u64) -> Vec<u32> {
    let mut state = seed;
    let mut price = 10_000i64;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let step = ((state >> 33) % 201) as i64 - 100;
            price = (price + step).max(1_000);
            price as u32
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scores_stay_within_bounds(
        cents in proptest::collection::vec(1_000u32..20_000, 60..240),
        ref_len in 5usize..20,
    ) {
        let series = series_from_cents(&cents);
        let ref_start = cents.len() - ref_len;
        let report = PatternScanner::new(ScanConfig::default().with_top_n(10))
            .scan(series.bars(), day(ref_start as i64), day(cents.len() as i64 - 1));

        if let Ok(report) = report {
            prop_assert!(report.matches.len() <= 10);
            for m in &report.matches {
                prop_assert!((-100.0..=100.0).contains(&m.score));
                prop_assert_eq!(m.normalized_curve.len(), ref_len);
            }
            prop_assert!(report.matches.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn scan_is_deterministic(
        cents in proptest::collection::vec(1_000u32..20_000, 60..200),
    ) {
        let series = series_from_cents(&cents);
        let end = cents.len() as i64 - 1;
        let scanner = PatternScanner::new(ScanConfig::default().exhaustive());

        let first = scanner.scan(series.bars(), day(end - 9), day(end));
        let second = scanner.scan(series.bars(), day(end - 9), day(end));
        prop_assert_eq!(first, second);
    }
}

#[test]
fn tied_scores_keep_scan_order() {
    // 12봉 주기로 정확히 반복되는 비대칭 패턴: 같은 위상의 구간은 모두 100점
    let cycle = [
        10_000u32, 10_150, 10_420, 10_310, 10_080, 9_870, 9_940, 10_260, 10_590, 10_470, 10_120,
        9_980,
    ];
    let cents: Vec<u32> = cycle.iter().copied().cycle().take(120).collect();
    let series = series_from_cents(&cents);

    // 마지막 주기(108..=119)를 기준 구간으로 사용
    let report = PatternScanner::new(ScanConfig::default().with_top_n(5).exhaustive())
        .scan(series.bars(), day(108), day(119))
        .unwrap();

    assert!(report.matches.iter().all(|m| m.score == 100.0));
    assert!(report
        .matches
        .windows(2)
        .all(|w| w[0].start_index < w[1].start_index
            && w[0].start_timestamp < w[1].start_timestamp));
    let starts: Vec<usize> = report.matches.iter().map(|m| m.start_index).collect();
    assert_eq!(starts, vec![0, 12, 24, 36, 48]);
}

#[test]
fn identical_shape_scores_exactly_one_hundred() {
    let mut cents = noisy_cents(120, 7);
    // 40..60 구간을 그대로 끝에 붙여 기준 구간으로 사용
    let copied: Vec<u32> = cents[40..60].to_vec();
    cents.extend(copied);
    let series = series_from_cents(&cents);

    let (reference, matches) = find_matches(series.bars(), day(120), day(139), 1).unwrap();

    assert_eq!(reference.len(), 20);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start_index, 40);
    assert_eq!(matches[0].score, 100.0);
    assert_eq!(matches[0].normalized_curve, reference.normalized_curve);
    assert_eq!(matches[0].start_timestamp, day(40));
    assert_eq!(matches[0].end_timestamp, day(59));
    assert!(matches[0].forward_return.is_some());
}

#[test]
fn four_bar_reference_is_too_short() {
    let series = series_from_cents(&noisy_cents(100, 3));
    let err = find_matches(series.bars(), day(96), day(99), 3).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::ReferenceTooShort {
            required: 5,
            provided: 4
        }
    );
}

#[test]
fn validation_runs_in_order() {
    let series = series_from_cents(&noisy_cents(30, 11));

    // top_n = 0 은 구간 길이보다 먼저 검사
    assert!(matches!(
        find_matches(series.bars(), day(27), day(29), 0),
        Err(AnalysisError::InvalidParameter(_))
    ));
    // 짧은 구간은 과거 데이터 부족보다 먼저 검사
    assert!(matches!(
        find_matches(series.bars(), day(1), day(3), 3),
        Err(AnalysisError::ReferenceTooShort { .. })
    ));
    assert!(matches!(
        find_matches(series.bars(), day(10), day(29), 3),
        Err(AnalysisError::InsufficientHistory {
            required: 20,
            available: 10
        })
    ));
}

#[test]
fn exhaustive_scan_finds_at_least_as_good_a_match() {
    let series = series_from_cents(&noisy_cents(400, 42));
    let strided = PatternScanner::new(ScanConfig::default().with_top_n(1))
        .scan(series.bars(), day(380), day(399))
        .unwrap();
    let exhaustive = PatternScanner::new(ScanConfig::default().with_top_n(1).exhaustive())
        .scan(series.bars(), day(380), day(399))
        .unwrap();

    assert!(exhaustive.matches[0].score >= strided.matches[0].score);
    assert!(
        exhaustive.candidates_evaluated + exhaustive.candidates_skipped
            > strided.candidates_evaluated + strided.candidates_skipped
    );
}

#[test]
fn summary_reflects_forward_returns() {
    let series = series_from_cents(&noisy_cents(300, 5));
    let report = PatternScanner::new(ScanConfig::default().with_top_n(5))
        .scan(series.bars(), day(280), day(299))
        .unwrap();

    let outcomes: Vec<f64> = report
        .matches
        .iter()
        .filter_map(|m| m.forward_return)
        .collect();
    assert_eq!(report.summary.matches_with_outcome, outcomes.len());
    if !outcomes.is_empty() {
        let mean = outcomes.iter().sum::<f64>() / outcomes.len() as f64;
        let mean_reported = report.summary.mean_forward_return.unwrap();
        assert!((mean_reported - mean).abs() < 1e-12);
    }
}

#[test]
fn cancellation_returns_no_partial_results() {
    let series = series_from_cents(&noisy_cents(3_000, 9));
    let mut config = ScanConfig::default().exhaustive();
    config.progress_interval = 100;
    let scanner = PatternScanner::new(config);

    let mut calls = 0;
    let mut observer = |_: &ScanProgress| -> ControlFlow<()> {
        calls += 1;
        ControlFlow::Break(())
    };
    let result = scanner.scan_with_observer(series.bars(), day(2_970), day(2_999), &mut observer);

    assert_eq!(result.unwrap_err(), AnalysisError::Cancelled);
    assert_eq!(calls, 1);
}
