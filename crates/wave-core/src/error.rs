//! 분석 엔진의 에러 타입.
//!
//! 스윙 추출, 민감도 추정, 패턴 스캔에서 발생하는 모든 실패를 정의합니다.
//! 모든 분석 함수는 부분 결과 없이 즉시 실패합니다.

use thiserror::Error;

/// 핵심 분석 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// 어떤 계산도 할 수 없을 만큼 시계열이 짧음
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 기준 구간 이전의 과거 데이터가 부족함
    #[error("과거 데이터가 부족합니다: 기준 구간 이전에 {required}개 이상 필요, {available}개 존재")]
    InsufficientHistory { required: usize, available: usize },

    /// 기준 구간의 봉 개수가 최소값 미만
    #[error("기준 구간이 너무 짧습니다: 최소 {required}개 필요, {provided}개 선택됨")]
    ReferenceTooShort { required: usize, provided: usize },

    /// 기준 구간의 시작가가 0이거나 정의되지 않아 정규화 불가
    #[error("기준 구간을 정규화할 수 없습니다: {0}")]
    DegenerateReference(String),

    /// 잘못된 파라미터 (deviation <= 0, top_n = 0, ref_start >= ref_end 등)
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 타임스탬프가 정렬되지 않았거나 중복된 시계열
    #[error("잘못된 시계열: {0}")]
    InvalidSeries(String),

    /// 관찰자 요청으로 스캔이 중단됨
    #[error("스캔이 취소되었습니다")]
    Cancelled,
}

/// 분석 작업을 위한 Result 타입.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    /// 다른 입력(더 긴 시계열, 다른 구간)으로 재시도하면 성공할 수 있는지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::InsufficientData { .. }
                | AnalysisError::InsufficientHistory { .. }
                | AnalysisError::ReferenceTooShort { .. }
        )
    }

    /// 잘못된 파라미터 에러를 생성합니다.
    pub fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter(msg.into())
    }
}
