//! 상관계수 및 곡선 정규화.
//!
//! 패턴 스캐너가 사용하는 수치 계산 모듈입니다.
//!
//! # 주요 기능
//!
//! - **Pearson 상관계수**: 두 곡선 간 선형 상관관계 측정
//! - **정규화 곡선**: 첫 값 대비 변화율로 변환하여 가격 수준과 무관한 형태만 비교
//!
//! # 예시
//!
//! ```rust
//! use wave_analytics::correlation::{calculate_correlation, normalize_to_first};
//!
//! let a = normalize_to_first(&[100.0, 102.0, 101.0, 105.0]).unwrap();
//! let b = normalize_to_first(&[50.0, 51.0, 50.5, 52.5]).unwrap();
//!
//! let corr = calculate_correlation(&a, &b).unwrap();
//! assert!((corr - 1.0).abs() < 1e-12);
//! ```

/// Pearson 상관계수 계산.
///
/// # 인자
///
/// * `x` - 첫 번째 시계열
/// * `y` - 두 번째 시계열
///
/// # 반환
///
/// 상관계수 (-1.0 ~ 1.0). 길이가 다르거나 2개 미만이거나, 한쪽의 분산이 0이거나,
/// 결과가 유한하지 않으면 `None`.
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;

    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // 표준편차가 0인 경우 (변동 없음)
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    // sqrt(v * v) == v 이므로 동일한 곡선은 정확히 1.0
    let corr = cov / (var_x * var_y).sqrt();
    if !corr.is_finite() {
        return None;
    }

    Some(corr.clamp(-1.0, 1.0))
}

/// 곡선을 첫 값 대비 변화율로 정규화합니다.
///
/// `out[i] = (values[i] - values[0]) / values[0]`
///
/// 첫 값이 0이거나 유한하지 않으면 `None`.
pub fn normalize_to_first(values: &[f64]) -> Option<Vec<f64>> {
    let base = *values.first()?;
    if base == 0.0 || !base.is_finite() {
        return None;
    }

    Some(values.iter().map(|v| (v - base) / base).collect())
}

/// `from`에서 `to`까지의 변화율(%). 기준이 0이면 `None`.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() {
        return None;
    }
    let pct = (to - from) / from * 100.0;
    pct.is_finite().then_some(pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_perfect_positive() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = calculate_correlation(&x, &y).unwrap();
        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![10.0, 8.0, 6.0, 4.0, 2.0];
        let corr = calculate_correlation(&x, &y).unwrap();
        assert!((corr + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_identical_is_exactly_one() {
        let x = vec![0.0, 0.013, -0.021, 0.0071, 0.05, 0.049];
        assert_eq!(calculate_correlation(&x, &x), Some(1.0));
    }

    #[test]
    fn test_correlation_uncorrelated() {
        let x = vec![1.0, 2.0, 3.0, 2.0, 1.0];
        let y = vec![3.0, 1.0, 3.0, 1.0, 3.0];
        let corr = calculate_correlation(&x, &y).unwrap();
        assert!(corr.abs() < 0.5);
    }

    #[test]
    fn test_correlation_zero_variance() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![5.0, 5.0, 5.0];
        assert!(calculate_correlation(&x, &y).is_none());
    }

    #[test]
    fn test_correlation_insufficient_data() {
        assert!(calculate_correlation(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn test_correlation_length_mismatch() {
        assert!(calculate_correlation(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_normalize_to_first() {
        let curve = normalize_to_first(&[100.0, 101.0, 99.0, 102.0]).unwrap();
        assert_eq!(curve[0], 0.0);
        assert!((curve[1] - 0.01).abs() < 1e-12);
        assert!((curve[2] + 0.01).abs() < 1e-12);

        assert!(normalize_to_first(&[0.0, 1.0]).is_none());
        assert!(normalize_to_first(&[]).is_none());
    }

    #[test]
    fn test_pct_change() {
        assert!((pct_change(100.0, 110.0).unwrap() - 10.0).abs() < 1e-12);
        assert_eq!(pct_change(0.0, 110.0), None);
    }
}
