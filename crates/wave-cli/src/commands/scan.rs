//! 과거 유사 패턴 스캔 명령.

use std::ops::ControlFlow;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use wave_analytics::{PatternScanner, ScanProgress};
use wave_core::{analysis_span, PriceSeries, ScanConfig, ScanReport};

use super::{format_json, format_pct, OutputFormat};

/// 스캔 설정.
#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub symbol: String,
    pub ref_start: DateTime<Utc>,
    pub ref_end: DateTime<Utc>,
    pub config: ScanConfig,
    /// 진행률 표시 여부
    pub progress: bool,
}

/// 스캔 결과.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    pub symbol: String,
    pub config: ScanConfig,
    #[serde(flatten)]
    pub report: ScanReport,
}

fn progress_bar(enabled: bool) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// 패턴 스캔을 실행합니다.
pub fn run(args: &ScanArgs, series: &PriceSeries) -> Result<ScanOutput> {
    let _span = analysis_span!("scan", args.symbol, top_n = args.config.top_n).entered();

    let scanner = PatternScanner::new(args.config.clone());
    let pb = progress_bar(args.progress)?;

    let mut observer = |progress: &ScanProgress| -> ControlFlow<()> {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.processed as u64);
        ControlFlow::Continue(())
    };

    let result =
        scanner.scan_with_observer(series.bars(), args.ref_start, args.ref_end, &mut observer);
    pb.finish_and_clear();

    if let Err(err) = &result {
        if err.is_recoverable() {
            warn!(
                symbol = %args.symbol,
                error = %err,
                "Not enough bars for this reference window, try a longer --period"
            );
        }
    }

    let report = result.with_context(|| {
        format!(
            "Pattern scan failed for {} ({} ~ {})",
            args.symbol,
            args.ref_start.format("%Y-%m-%d"),
            args.ref_end.format("%Y-%m-%d")
        )
    })?;

    info!(
        matches = report.matches.len(),
        evaluated = report.candidates_evaluated,
        skipped = report.candidates_skipped,
        "Pattern scan finished"
    );

    Ok(ScanOutput {
        symbol: args.symbol.clone(),
        config: args.config.clone(),
        report,
    })
}

pub fn render(output: &ScanOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(output)),
        OutputFormat::Json => format_json(output),
    }
}

fn format_table(output: &ScanOutput) -> String {
    let report = &output.report;
    let mut text = String::new();

    text.push_str(&format!(
        "{} | reference {} ~ {} ({} bars)\n",
        output.symbol,
        report.reference.start_timestamp.format("%Y-%m-%d"),
        report.reference.end_timestamp.format("%Y-%m-%d"),
        report.reference.len()
    ));
    text.push_str(&format!(
        "stride {} | forward {} bars | {} windows scored, {} skipped\n\n",
        output.config.effective_stride(),
        output.config.forward_bars,
        report.candidates_evaluated,
        report.candidates_skipped
    ));

    text.push_str(&format!(
        "{:<5} {:<12} {:<12} {:>8} {:>10}\n",
        "RANK", "START", "END", "SCORE", "FORWARD"
    ));
    text.push_str(&"-".repeat(51));
    text.push('\n');

    for (rank, m) in report.matches.iter().enumerate() {
        text.push_str(&format!(
            "{:<5} {:<12} {:<12} {:>8.1} {:>10}\n",
            rank + 1,
            m.start_timestamp.format("%Y-%m-%d"),
            m.end_timestamp.format("%Y-%m-%d"),
            m.score,
            format_pct(m.forward_return)
        ));
    }

    let summary = &report.summary;
    text.push('\n');
    text.push_str(&format!(
        "Mean forward return: {} ({} of {} matches with outcome",
        format_pct(summary.mean_forward_return),
        summary.matches_with_outcome,
        report.matches.len()
    ));
    match summary.positive_ratio {
        Some(ratio) => text.push_str(&format!(", {:.0}% positive)", ratio * 100.0)),
        None => text.push(')'),
    }

    text
}
