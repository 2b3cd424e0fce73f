//! 파동 분석 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 스윙 파동 분석 (`waves`)
//! - 변동성 기반 임계값 추천 (`suggest`)
//! - 과거 유사 패턴 스캔 (`scan`)

pub mod commands;

pub use commands::*;
