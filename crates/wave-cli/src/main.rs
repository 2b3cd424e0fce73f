//! 파동 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # EUR/USD 스윙 파동 (임계값 1.2%)
//! wave waves -s EURUSD=X --deviation 1.2
//!
//! # 최근 90일 변동성 기반 임계값으로 파동 분석, JSON 출력
//! wave waves -s SPY --auto --format json
//!
//! # 임계값 추천만 보기
//! wave suggest -s SPY --lookback-days 60
//!
//! # 2024년 3월 구간과 비슷한 과거 구간 5개 찾기 (5년 데이터, 전수 탐색)
//! wave --period 5y scan -s SPY --ref-start 2024-03-01 --ref-end 2024-03-29 --top-n 5 --exhaustive
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use wave_cli::commands::{parse_date, scan, suggest, waves, DataArgs, OutputFormat};
use wave_core::{init_logging, AppConfig, Interval, LogConfig, Period, ScanMode};

#[derive(Parser)]
#[command(name = "wave")]
#[command(about = "Wave Hunter - 스윙 파동 분석 및 과거 유사 패턴 탐색", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// CSV 데이터 디렉토리 (설정의 data.dir 대체)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// 읽을 CSV 파일 (심볼별 파일 규칙 무시)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// 데이터 기간 (1mo, 6mo, 1y, 2y, 5y, max)
    #[arg(long, global = true)]
    period: Option<Period>,

    /// 봉 간격 (5m, 15m, 30m, 1h, 1d, 1wk, 1mo)
    #[arg(long, global = true)]
    interval: Option<Interval>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 스윙 파동(피봇/레그)과 파동 통계 출력
    Waves {
        /// 종목 심볼 (예: EURUSD=X, SPY)
        #[arg(short, long)]
        symbol: String,

        /// 반전 임계값 (%, 예: 1.2)
        #[arg(short, long, conflicts_with = "auto")]
        deviation: Option<Decimal>,

        /// 최근 변동성 기반 추천 임계값 사용
        #[arg(long)]
        auto: bool,

        /// 추천 임계값 계산 기간 (일)
        #[arg(long)]
        lookback_days: Option<u32>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// 최근 변동성 기반 임계값 추천
    Suggest {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 계산 기간 (일)
        #[arg(long)]
        lookback_days: Option<u32>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// 기준 구간과 비슷한 과거 구간 탐색
    Scan {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 기준 구간 시작 (YYYY-MM-DD)
        #[arg(long)]
        ref_start: String,

        /// 기준 구간 종료 (YYYY-MM-DD, 해당 일 포함)
        #[arg(long)]
        ref_end: String,

        /// 반환할 매치 수
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// 후보 구간 간격 (봉)
        #[arg(long, conflicts_with = "exhaustive")]
        stride: Option<usize>,

        /// 모든 시작 위치 탐색 (stride = 1)
        #[arg(long)]
        exhaustive: bool,

        /// 결과 측정 기간 (봉)
        #[arg(long)]
        forward_bars: Option<usize>,

        /// 진행률 표시 끄기
        #[arg(long)]
        no_progress: bool,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    debug!(config = %cli.config.display(), "Configuration loaded");

    let mut data = DataArgs::from(&config.data);
    if let Some(dir) = cli.data_dir {
        data.dir = dir;
    }
    data.file = cli.file;
    if let Some(period) = cli.period {
        data.period = period;
    }
    if let Some(interval) = cli.interval {
        data.interval = interval;
    }

    let output = match cli.command {
        Commands::Waves {
            symbol,
            deviation,
            auto,
            lookback_days,
            format,
        } => {
            let deviation = match (deviation, auto) {
                (Some(pct), _) => waves::DeviationChoice::Fixed(pct),
                (None, true) => waves::DeviationChoice::Auto {
                    lookback_days: lookback_days.unwrap_or(config.sensitivity.lookback_days),
                },
                (None, false) => waves::DeviationChoice::Fixed(config.pivot.deviation_pct),
            };
            let waves_config = waves::WavesConfig {
                symbol: symbol.clone(),
                deviation,
                fallback_pct: config.pivot.deviation_pct,
            };

            let series = data.load(&symbol)?;
            let report = waves::run(&waves_config, &series)?;
            waves::render(&report, format)?
        }

        Commands::Suggest {
            symbol,
            lookback_days,
            format,
        } => {
            let lookback_days = lookback_days.unwrap_or(config.sensitivity.lookback_days);
            let series = data.load(&symbol)?;
            let report = suggest::run(&symbol, lookback_days, &series)?;
            suggest::render(&report, format)?
        }

        Commands::Scan {
            symbol,
            ref_start,
            ref_end,
            top_n,
            stride,
            exhaustive,
            forward_bars,
            no_progress,
            format,
        } => {
            let mut scan_config = config.scanner.clone();
            if let Some(top_n) = top_n {
                scan_config = scan_config.with_top_n(top_n);
            }
            if let Some(stride) = stride {
                scan_config = scan_config.with_stride(stride);
                scan_config.mode = ScanMode::Strided;
            }
            if exhaustive {
                scan_config = scan_config.exhaustive();
            }
            if let Some(forward_bars) = forward_bars {
                scan_config = scan_config.with_forward_bars(forward_bars);
            }

            let args = scan::ScanArgs {
                symbol: symbol.clone(),
                ref_start: parse_date(&ref_start, false)?,
                ref_end: parse_date(&ref_end, true)?,
                config: scan_config,
                progress: !no_progress && format == OutputFormat::Table,
            };

            let series = data.load(&symbol)?;
            let output = scan::run(&args, &series)?;
            scan::render(&output, format)?
        }
    };

    println!("{}", output);
    info!("Done");

    Ok(())
}
