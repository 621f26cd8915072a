//! Call commands: import, list, show.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use callcoach_types::call::CallImport;

use super::coach::{print_artifact, truncate};
use super::{format_duration, format_timestamp};
use crate::state::AppState;

/// Read a `CallImport` document and store it.
pub async fn import_call(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let import = parse_import(&content)
        .with_context(|| format!("invalid call import {}", file.display()))?;
    let segments = import.segments.len();

    let call = state.report_service.import_call(import).await?;

    if json {
        let body = serde_json::json!({ "call": call, "segments": segments });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Imported {} ({} segments)",
        style("✓").green().bold(),
        style(&call.title).cyan(),
        segments
    );
    println!(
        "  Transcript stored in {}",
        style(state.data_dir.join("transcripts").display()).dim()
    );
    println!();
    Ok(())
}

fn parse_import(content: &str) -> Result<CallImport> {
    Ok(serde_json::from_str(content)?)
}

pub async fn list_calls(state: &AppState, json: bool) -> Result<()> {
    let calls = state.report_service.list_calls().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&calls)?);
        return Ok(());
    }

    if calls.is_empty() {
        println!();
        println!(
            "  {} No calls found. Import one with: {}",
            style("i").blue().bold(),
            style("callcoach import <file>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Call").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Rep").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Duration").fg(Color::White),
        Cell::new("Coached").fg(Color::White),
    ]);

    for summary in &calls {
        let call = &summary.call;
        let coached = if summary.coached {
            Cell::new("● yes").fg(Color::Green)
        } else {
            Cell::new("○ no").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&call.call_id),
            Cell::new(truncate(&call.title, 40)),
            Cell::new(&call.rep_name),
            Cell::new(format_timestamp(&call.start_time)),
            Cell::new(format_duration(call.duration_sec)),
            coached,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn show_call(state: &AppState, call_id: &str, json: bool) -> Result<()> {
    let detail = state.report_service.call_detail(call_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let call = &detail.call;
    println!();
    println!("  {}", style(&call.title).bold().cyan());
    println!("  {}  {}", style("Rep:").bold(), call.rep_name);
    println!(
        "  {}  {}",
        style("Started:").bold(),
        format_timestamp(&call.start_time)
    );
    println!(
        "  {}  {}",
        style("Duration:").bold(),
        format_duration(call.duration_sec)
    );
    if let Some(url) = &call.source_url {
        println!("  {}  {}", style("Recording:").bold(), style(url).dim());
    }
    println!(
        "  {}  {} segments",
        style("Transcript:").bold(),
        detail.transcript.len()
    );

    match &detail.coaching {
        Some(artifact) => print_artifact(artifact, &[]),
        None => {
            println!();
            println!(
                "  {} Not coached yet. Run: {}",
                style("i").blue().bold(),
                style(format!("callcoach coach {call_id}")).yellow()
            );
            println!();
        }
    }
    Ok(())
}
