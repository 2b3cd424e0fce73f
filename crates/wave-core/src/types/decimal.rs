//! 가격 계산을 위한 Decimal 유틸리티.
//!
//! 가격은 정확한 비교가 필요하므로 `Decimal`로 다루고, 상관계수처럼
//! 통계 계산이 필요한 곳에서만 `f64`로 변환합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 퍼센트 타입 (1.5 = 1.5%).
pub type Percentage = Decimal;

/// 비율 타입 (0.015 = 1.5%).
pub type Fraction = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// `f64`로 변환합니다. 표현할 수 없는 값은 NaN이 됩니다.
    fn to_f64_lossy(&self) -> f64;

    /// `self`에서 `to`까지의 변화율(비율)을 반환합니다.
    /// 기준이 0이거나 결과가 `Decimal` 범위를 넘으면 `None`.
    fn fraction_change_to(&self, to: Decimal) -> Option<Fraction>;

    /// `self`에서 `to`까지의 변화율(%)을 반환합니다.
    /// 기준이 0이거나 결과가 `Decimal` 범위를 넘으면 `None`.
    fn pct_change_to(&self, to: Decimal) -> Option<Percentage>;

    /// 부호가 포함된 퍼센트 문자열로 변환합니다 (예: "+2.64%").
    fn to_signed_pct_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    fn fraction_change_to(&self, to: Decimal) -> Option<Fraction> {
        if self.is_zero() {
            return None;
        }
        to.checked_sub(*self)?.checked_div(*self)
    }

    fn pct_change_to(&self, to: Decimal) -> Option<Percentage> {
        self.fraction_change_to(to)?.checked_mul(Decimal::ONE_HUNDRED)
    }

    fn to_signed_pct_string(&self) -> String {
        let rounded = self.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("{:.2}%", rounded)
        } else {
            format!("+{:.2}%", rounded.abs())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pct_change() {
        assert_eq!(dec!(100).pct_change_to(dec!(105)), Some(dec!(5)));
        assert_eq!(dec!(105).fraction_change_to(dec!(99)).map(|f| f.round_dp(4)), Some(dec!(-0.0571)));
        assert_eq!(Decimal::ZERO.pct_change_to(dec!(1)), None);
    }

    #[test]
    fn test_change_out_of_range() {
        let tiny = dec!(0.0000000000000000000001);
        assert_eq!(tiny.fraction_change_to(dec!(1000000000)), None);
        assert_eq!(tiny.pct_change_to(dec!(1000000000)), None);
        // 하락 방향은 -100%를 넘지 않음
        assert_eq!(dec!(1000000000).pct_change_to(tiny).map(|p| p.round()), Some(dec!(-100)));
    }

    #[test]
    fn test_signed_pct_string() {
        assert_eq!(dec!(2.6449).to_signed_pct_string(), "+2.64%");
        assert_eq!(dec!(-5.714).to_signed_pct_string(), "-5.71%");
        assert_eq!(dec!(0).to_signed_pct_string(), "+0.00%");
    }

    #[test]
    fn test_to_f64_lossy() {
        assert_eq!(dec!(1.25).to_f64_lossy(), 1.25);
    }
}
