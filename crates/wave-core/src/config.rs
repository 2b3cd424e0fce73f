//! 설정 관리.
//!
//! 기본값 → TOML 파일 → `WAVE__SECTION__KEY` 환경 변수 순으로 덮어씁니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{Fraction, Interval, Percentage, Period};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 피봇 추출 설정
    pub pivot: PivotConfig,
    /// 민감도 추정 설정
    pub sensitivity: SensitivityConfig,
    /// 패턴 스캔 설정
    pub scanner: ScanConfig,
    /// 데이터 로딩 설정
    pub data: DataConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            with_file: false,
        }
    }
}

/// 피봇 추출 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PivotConfig {
    /// 반전 확정 임계값 (%, 1.2 = 1.2%)
    pub deviation_pct: Percentage,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            deviation_pct: dec!(1.2),
        }
    }
}

impl PivotConfig {
    /// 임계값을 추출기가 사용하는 비율(0.012)로 반환합니다.
    pub fn deviation(&self) -> Fraction {
        self.deviation_pct / Decimal::ONE_HUNDRED
    }
}

/// 민감도 추정 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// 변동성 측정 기간 (일)
    pub lookback_days: u32,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self { lookback_days: 90 }
    }
}

/// 후보 구간 탐색 방식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// `stride` 간격으로 건너뛰며 탐색 (빠름, 사이 구간은 평가하지 않음)
    #[default]
    Strided,
    /// 모든 시작 위치를 탐색 (stride = 1)
    Exhaustive,
}

/// 패턴 스캔 설정.
///
/// `stride`와 `forward_bars`는 재현율과 "결과"의 정의를 바꾸므로
/// 결과를 캐시할 때는 이 설정 전체를 키에 포함해야 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 반환할 상위 매치 수
    pub top_n: usize,
    /// 후보 구간 간격 (봉)
    pub stride: usize,
    /// 결과 측정 기간 (봉)
    pub forward_bars: usize,
    /// 진행률 보고 간격 (후보 구간 수)
    pub progress_interval: usize,
    /// 탐색 방식
    pub mode: ScanMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            stride: 5,
            forward_bars: 10,
            progress_interval: 1000,
            mode: ScanMode::Strided,
        }
    }
}

impl ScanConfig {
    /// 모든 시작 위치를 탐색하는 설정으로 전환합니다.
    pub fn exhaustive(mut self) -> Self {
        self.mode = ScanMode::Exhaustive;
        self
    }

    /// 상위 매치 수를 설정합니다.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// 후보 간격을 설정합니다.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// 결과 측정 기간을 설정합니다.
    pub fn with_forward_bars(mut self, forward_bars: usize) -> Self {
        self.forward_bars = forward_bars;
        self
    }

    /// 실제로 사용할 간격. `Exhaustive`는 항상 1.
    pub fn effective_stride(&self) -> usize {
        match self.mode {
            ScanMode::Strided => self.stride,
            ScanMode::Exhaustive => 1,
        }
    }

    /// 설정값을 검증합니다.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.top_n == 0 {
            return Err(AnalysisError::invalid("top_n must be at least 1"));
        }
        if self.effective_stride() == 0 {
            return Err(AnalysisError::invalid("stride must be at least 1"));
        }
        if self.forward_bars == 0 {
            return Err(AnalysisError::invalid("forward_bars must be at least 1"));
        }
        Ok(())
    }
}

/// 데이터 로딩 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV 파일 디렉토리
    pub dir: String,
    /// 기본 조회 기간
    pub period: Period,
    /// 기본 봉 간격
    pub interval: Interval,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            period: Period::OneYear,
            interval: Interval::D1,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (없어도 됨)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("WAVE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
