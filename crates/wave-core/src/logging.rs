//! tracing을 사용한 로깅 인프라.
//!
//! 라이브러리 크레이트는 이벤트만 기록하고, 구독자 초기화는 바이너리에서
//! 한 번만 수행합니다.
//!
//! - **pretty**: 개발용 사람이 읽기 쉬운 형식
//! - **json**: 로그 수집용 JSON 형식
//! - **compact**: 한 줄 형식

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식
    #[default]
    Pretty,
    /// JSON 형식
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "wave_analytics=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 파일명과 줄 번호 포함 여부
    pub with_file: bool,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 파일 위치 출력 여부를 설정합니다.
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self::new(config.level.clone())
            .with_format(config.format.parse().unwrap_or_default())
            .with_file(config.with_file)
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선합니다.
/// 로그는 표준 에러로 출력되어 표준 출력의 결과(JSON 등)와 섞이지 않습니다.
///
/// # 예제
///
/// ```no_run
/// use wave_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig::new("debug").with_format(LogFormat::Json);
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_file(config.with_file)
                .with_line_number(config.with_file)
                .with_target(config.with_target);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

/// 분석 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, $symbol:expr) => {
        tracing::info_span!($name, symbol = %$symbol)
    };
    ($name:expr, $symbol:expr, $param:ident = $value:expr) => {
        tracing::info_span!($name, symbol = %$symbol, $param = %$value)
    };
}
