//! 임계값 추천 명령.

use anyhow::Result;
use serde::Serialize;
use wave_analytics::{SensitivityEstimator, SensitivitySuggestion};
use wave_core::{analysis_span, PriceSeries};

use super::{format_json, OutputFormat};

/// 추천 결과.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestReport {
    pub symbol: String,
    pub lookback_days: u32,
    #[serde(flatten)]
    pub suggestion: SensitivitySuggestion,
}

/// 최근 `lookback_days`일의 변동성으로 임계값을 추천합니다.
pub fn run(symbol: &str, lookback_days: u32, series: &PriceSeries) -> Result<SuggestReport> {
    let _span = analysis_span!("suggest", symbol, lookback_days = lookback_days).entered();

    let suggestion = SensitivityEstimator::new(lookback_days)?.suggest(series.bars());

    Ok(SuggestReport {
        symbol: symbol.to_string(),
        lookback_days,
        suggestion,
    })
}

pub fn render(report: &SuggestReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(report),
        OutputFormat::Table if report.suggestion.is_empty() => Ok(format!(
            "{}: not enough bars in the last {} days to suggest a deviation",
            report.symbol, report.lookback_days
        )),
        OutputFormat::Table => Ok(format!(
            "{}: suggested deviation {}% (mean move {:.4}% over {} bars, last {} days)",
            report.symbol,
            report.suggestion.deviation_pct,
            report.suggestion.mean_abs_change_pct,
            report.suggestion.window_bars,
            report.lookback_days
        )),
    }
}
