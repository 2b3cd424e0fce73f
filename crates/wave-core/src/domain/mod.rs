//! 파동 및 패턴 분석을 위한 도메인 모델.

mod bar;
mod pattern;
mod source;
mod swing;

pub use bar::*;
pub use pattern::*;
pub use source::*;
pub use swing::*;
