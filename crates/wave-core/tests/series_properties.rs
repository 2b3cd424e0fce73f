//! 가격 시계열 속성 테스트.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use wave_core::{AnalysisError, Bar, Period, PriceSeries};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn bars_at(days: &[i64]) -> Vec<Bar> {
    days.iter().map(|d| Bar::from_close(day(*d), dec!(100))).collect()
}

proptest! {
    #[test]
    fn sorted_unique_timestamps_are_accepted(
        days in proptest::collection::btree_set(0i64..5_000, 0..300),
    ) {
        let days: Vec<i64> = days.into_iter().collect();
        let series = PriceSeries::new("TEST", bars_at(&days)).unwrap();
        prop_assert_eq!(series.len(), days.len());
    }

    #[test]
    fn duplicated_timestamp_is_rejected(
        days in proptest::collection::btree_set(0i64..5_000, 1..300),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut days: Vec<i64> = days.into_iter().collect();
        let dup = days[pick.index(days.len())];
        days.push(dup);
        days.sort_unstable();

        let err = PriceSeries::new("TEST", bars_at(&days)).unwrap_err();
        prop_assert!(matches!(err, AnalysisError::InvalidSeries(_)));
    }

    #[test]
    fn range_stays_within_bounds(
        days in proptest::collection::btree_set(0i64..2_000, 1..200),
        start in 0i64..2_000,
        len in 0i64..500,
    ) {
        let days: Vec<i64> = days.into_iter().collect();
        let series = PriceSeries::new("TEST", bars_at(&days)).unwrap();
        let (from, to) = (day(start), day(start + len));

        let window = series.range(from, to);
        prop_assert!(window.iter().all(|b| b.timestamp >= from && b.timestamp <= to));
        prop_assert_eq!(
            window.len(),
            days.iter().filter(|d| **d >= start && **d <= start + len).count()
        );
    }

    #[test]
    fn longer_periods_never_cut_later(last in 400i64..5_000) {
        let last = day(last);
        let periods = [
            Period::OneMonth,
            Period::SixMonths,
            Period::OneYear,
            Period::TwoYears,
            Period::FiveYears,
        ];
        let cutoffs: Vec<DateTime<Utc>> =
            periods.iter().filter_map(|p| p.cutoff(last)).collect();

        prop_assert_eq!(cutoffs.len(), periods.len());
        prop_assert!(cutoffs.windows(2).all(|w| w[0] > w[1]));
        prop_assert!(cutoffs.iter().all(|c| *c < last));
    }
}
