//! # Wave Core
//!
//! 파동 분석 및 패턴 스캔의 핵심 도메인 모델과 타입을 제공합니다.
//!
//! - 가격 봉 및 검증된 시계열
//! - 피봇/파동 및 패턴 매치 결과 타입
//! - 시계열 제공자 추상화
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
