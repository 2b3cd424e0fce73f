//! 가격 시계열 데이터 로딩.
//!
//! 이 crate는 다음을 제공합니다:
//! - CSV 파일 기반 `SeriesSource` 구현
//! - 수정 종가(`Adj Close`) 대체 처리
//! - 조회 기간(`1y`, `2y`, `5y`, `max`)에 따른 시계열 절단

pub mod csv_source;
pub mod error;
mod parse;

pub use csv_source::{ColumnLayout, CsvSeriesSource};
pub use error::{DataError, Result};
