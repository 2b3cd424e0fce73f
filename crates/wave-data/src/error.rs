//! 데이터 모듈 오류 타입.

use thiserror::Error;
use wave_core::AnalysisError;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 형식 오류
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 필수 컬럼 없음
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// 필드 파싱 오류
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// 잘못된 데이터 (정렬/중복/빈 시계열)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 시계열을 찾을 수 없음
    #[error("Series not found: {0}")]
    NotFound(String),
}

impl From<AnalysisError> for DataError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidSeries(msg) => DataError::InvalidData(msg),
            other => DataError::InvalidData(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
