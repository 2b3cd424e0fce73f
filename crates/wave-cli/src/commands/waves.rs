//! 스윙 파동 분석 명령.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use wave_analytics::{PivotExtractor, SensitivityEstimator, TrendState, WaveStatistics};
use wave_core::{analysis_span, DecimalExt, Percentage, Pivot, PriceSeries, Wave};

use super::{format_json, OutputFormat};

/// 임계값 결정 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationChoice {
    /// 사용자가 지정한 값 (%)
    Fixed(Percentage),
    /// 최근 변동성 기반 추천값
    Auto { lookback_days: u32 },
}

/// 파동 분석 설정.
#[derive(Debug, Clone)]
pub struct WavesConfig {
    pub symbol: String,
    pub deviation: DeviationChoice,
    /// 추천값을 만들 수 없을 때 사용할 기본 임계값 (%)
    pub fallback_pct: Percentage,
}

/// 파동 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct WavesReport {
    pub symbol: String,
    pub bars: usize,
    /// 실제 사용한 임계값 (%)
    pub deviation_pct: Percentage,
    /// 자동 추천값을 사용했는지 여부
    pub auto: bool,
    pub pivots: Vec<Pivot>,
    pub waves: Vec<Wave>,
    pub final_state: TrendState,
    pub statistics: WaveStatistics,
}

/// 사용할 임계값(%)을 결정합니다.
fn resolve_deviation(config: &WavesConfig, series: &PriceSeries) -> Result<(Percentage, bool)> {
    match config.deviation {
        DeviationChoice::Fixed(pct) => Ok((pct, false)),
        DeviationChoice::Auto { lookback_days } => {
            let suggestion = SensitivityEstimator::new(lookback_days)?.suggest(series.bars());
            if suggestion.is_empty() {
                warn!(
                    lookback_days,
                    fallback_pct = %config.fallback_pct,
                    "Not enough recent bars to suggest a deviation, using fallback"
                );
                Ok((config.fallback_pct, false))
            } else {
                Ok((suggestion.deviation_pct, true))
            }
        }
    }
}

/// 파동 분석을 실행합니다.
pub fn run(config: &WavesConfig, series: &PriceSeries) -> Result<WavesReport> {
    let _span = analysis_span!("waves", config.symbol).entered();

    let (deviation_pct, auto) = resolve_deviation(config, series)?;
    let extractor = PivotExtractor::new(deviation_pct / Decimal::ONE_HUNDRED)
        .with_context(|| format!("Invalid deviation: {}%", deviation_pct))?;
    let analysis = extractor
        .extract(series.bars())
        .context("Swing extraction failed")?;

    let statistics = WaveStatistics::from_waves(&analysis.waves);

    info!(
        deviation_pct = %deviation_pct,
        pivots = analysis.pivots.len(),
        waves = analysis.waves.len(),
        "Waves extracted"
    );

    Ok(WavesReport {
        symbol: config.symbol.clone(),
        bars: series.len(),
        deviation_pct,
        auto,
        pivots: analysis.pivots,
        waves: analysis.waves,
        final_state: analysis.final_state,
        statistics,
    })
}

/// 결과를 문자열로 변환합니다.
pub fn render(report: &WavesReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(report)),
        OutputFormat::Json => format_json(report),
    }
}

fn format_table(report: &WavesReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} | {} bars | deviation {}%{}\n\n",
        report.symbol,
        report.bars,
        report.deviation_pct,
        if report.auto { " (auto)" } else { "" }
    ));

    output.push_str(&format!("{:<22} {:<8} {:>14}\n", "DATE", "TYPE", "PRICE"));
    output.push_str(&"-".repeat(46));
    output.push('\n');
    for pivot in &report.pivots {
        output.push_str(&format!(
            "{:<22} {:<8} {:>14}\n",
            pivot.timestamp.format("%Y-%m-%d %H:%M"),
            pivot.kind.to_string(),
            pivot.price
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "{:<12} {:<12} {:>14} {:>14} {:>10} {:<5}\n",
        "FROM", "TO", "START", "END", "CHANGE", "DIR"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');
    for wave in &report.waves {
        output.push_str(&format!(
            "{:<12} {:<12} {:>14} {:>14} {:>10} {:<5}\n",
            wave.start_timestamp.format("%Y-%m-%d"),
            wave.end_timestamp.format("%Y-%m-%d"),
            wave.start_price,
            wave.end_price,
            wave.pct_change.to_signed_pct_string(),
            wave.direction.to_string()
        ));
    }

    let stats = &report.statistics;
    let pct = |v: Option<Decimal>| v.map_or_else(|| "-".to_string(), |d| format!("{:.2}%", d));

    output.push('\n');
    output.push_str(&format!(
        "Up legs:   {:>3}  avg {:>8}  max {:>8}\n",
        stats.up.count,
        pct(stats.up.mean_abs_pct),
        pct(stats.up.max_abs_pct)
    ));
    output.push_str(&format!(
        "Down legs: {:>3}  avg {:>8}  max {:>8}\n",
        stats.down.count,
        pct(stats.down.mean_abs_pct),
        pct(stats.down.max_abs_pct)
    ));
    output.push_str(&format!("Trend: {:?}", report.final_state));

    output
}
