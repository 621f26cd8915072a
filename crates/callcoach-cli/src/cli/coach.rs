//! `callcoach coach` and `callcoach history`.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use callcoach_types::coaching::CoachingArtifact;
use callcoach_types::ledger::RepLedgerEntry;
use callcoach_types::skill::Skill;

use super::{format_timestamp, score_cell};
use crate::state::AppState;

/// Coach one call. Ctrl-C abandons the run until the record is being saved.
pub async fn coach_call(
    state: &AppState,
    call_id: &str,
    model: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let model_label = model.unwrap_or(state.coaching_service.default_model());
    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        spinner.set_message(format!("Coaching {call_id} with {model_label}..."));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    };

    let token = CancellationToken::new();
    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };

    let result = state
        .coaching_service
        .run_with_cancel(call_id, model, &token)
        .await;
    watcher.abort();
    spinner.finish_and_clear();
    let outcome = result?;

    if json {
        let body = serde_json::json!({
            "record": outcome.record,
            "ledger": outcome.ledger_entries,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }
    if quiet {
        return Ok(());
    }

    println!();
    println!(
        "  {} Coached {} with {}",
        style("✓").green().bold(),
        style(call_id).cyan(),
        style(&outcome.record.model_id).dim()
    );
    print_artifact(&outcome.record.artifact(), &outcome.ledger_entries);
    Ok(())
}

/// Every coaching record for a call, newest first.
pub async fn show_history(state: &AppState, call_id: &str, json: bool) -> Result<()> {
    let records = state.report_service.history(call_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No coaching yet for {}. Run: {}",
            style("i").blue().bold(),
            call_id,
            style(format!("callcoach coach {call_id}")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Coached").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Avg").fg(Color::White),
        Cell::new("Summary").fg(Color::White),
    ]);
    for record in &records {
        let avg = match record.scores.mean() {
            Some(mean) => score_cell(mean),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(format_timestamp(&record.coached_at)),
            Cell::new(&record.model_id),
            avg,
            Cell::new(truncate(&record.summary, 60)),
        ]);
    }
    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Scores (with trend columns when ledger entries are given), then the
/// narrative sections.
pub(crate) fn print_artifact(artifact: &CoachingArtifact, ledger: &[RepLedgerEntry]) {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![
        Cell::new("Skill").fg(Color::White),
        Cell::new("Score").fg(Color::White),
    ];
    if !ledger.is_empty() {
        header.push(Cell::new("Rolling").fg(Color::White));
        header.push(Cell::new("Trend").fg(Color::White));
    }
    table.set_header(header);

    for skill in Skill::ALL {
        let score = match artifact.scores.get(skill) {
            Some(score) => score_cell(f64::from(score)),
            None => Cell::new("-"),
        };
        let mut row = vec![Cell::new(skill.as_str()), score];
        if let Some(entry) = ledger.iter().find(|e| e.skill == skill) {
            row.push(score_cell(entry.rolling_score));
            row.push(trend_cell(entry));
        } else if !ledger.is_empty() {
            row.push(Cell::new("-"));
            row.push(Cell::new("-"));
        }
        table.add_row(row);
    }
    println!();
    println!("{table}");

    print_list("Strengths", &artifact.strengths);
    print_list("Improvements", &artifact.improvements);

    if !artifact.objections.is_empty() {
        println!();
        println!("  {}", style("Objections").bold());
        for objection in &artifact.objections {
            println!("    {} {}", style("•").dim(), objection.objection);
            println!("      {}", style(&objection.handling).dim());
        }
    }

    if !artifact.summary.is_empty() {
        println!();
        println!("  {}", style("Summary").bold());
        println!("  {}", artifact.summary);
    }
    println!();
}

pub(crate) fn trend_cell(entry: &RepLedgerEntry) -> Cell {
    let arrow = if entry.trend_delta > 0.0 {
        "▲"
    } else if entry.trend_delta < 0.0 {
        "▼"
    } else {
        "="
    };
    let text = format!("{arrow} {:+.2}", entry.trend_delta);
    if entry.open_focus_area {
        Cell::new(format!("{text} focus")).fg(Color::Red)
    } else {
        Cell::new(text)
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("  {}", style(title).bold());
    for item in items {
        println!("    {} {item}", style("•").dim());
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
