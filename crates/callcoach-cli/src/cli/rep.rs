//! Rep commands: summary list and trend detail.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use super::coach::{trend_cell, truncate};
use super::{format_timestamp, score_cell};
use crate::state::AppState;

pub async fn list_reps(state: &AppState, json: bool) -> Result<()> {
    let reps = state.report_service.rep_summaries().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reps)?);
        return Ok(());
    }

    if reps.is_empty() {
        println!();
        println!("  {} No reps yet; import a call first.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Rep").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Calls").fg(Color::White),
        Cell::new("Avg Score").fg(Color::White),
    ]);
    for rep in &reps {
        let avg = match rep.avg_score {
            Some(avg) => score_cell(avg),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&rep.rep_id),
            Cell::new(&rep.rep_name),
            Cell::new(rep.call_count),
            avg,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

pub async fn show_rep(state: &AppState, rep_id: &str, json: bool) -> Result<()> {
    let detail = state.report_service.rep_detail(rep_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&detail.rep_name).bold().cyan(),
        style(format!("({})", detail.rep_id)).dim()
    );

    if detail.trends.is_empty() {
        println!();
        println!("  {} No coaching trends yet.", style("i").blue().bold());
    } else {
        let mut trends = Table::new();
        trends.load_preset(presets::UTF8_FULL_CONDENSED);
        trends.set_content_arrangement(ContentArrangement::Dynamic);
        trends.set_header(vec![
            Cell::new("Skill").fg(Color::White),
            Cell::new("Rolling").fg(Color::White),
            Cell::new("Previous").fg(Color::White),
            Cell::new("Trend").fg(Color::White),
            Cell::new("Updated").fg(Color::White),
        ]);
        for entry in &detail.trends {
            trends.add_row(vec![
                Cell::new(entry.skill.as_str()),
                score_cell(entry.rolling_score),
                Cell::new(format!("{:.1}", entry.prev_rolling_score)),
                trend_cell(entry),
                Cell::new(format_timestamp(&entry.last_updated)),
            ]);
        }
        println!();
        println!("{trends}");

        let focus: Vec<&str> = detail
            .trends
            .iter()
            .filter(|e| e.open_focus_area)
            .map(|e| e.skill.as_str())
            .collect();
        if !focus.is_empty() {
            println!("  {} {}", style("Focus areas:").red().bold(), focus.join(", "));
        }
    }

    if !detail.recent_coaching.is_empty() {
        let mut recent = Table::new();
        recent.load_preset(presets::UTF8_FULL_CONDENSED);
        recent.set_content_arrangement(ContentArrangement::Dynamic);
        recent.set_header(vec![
            Cell::new("Coached").fg(Color::White),
            Cell::new("Call").fg(Color::White),
            Cell::new("Avg").fg(Color::White),
            Cell::new("Summary").fg(Color::White),
        ]);
        for item in &detail.recent_coaching {
            let avg = match item.scores.mean() {
                Some(mean) => score_cell(mean),
                None => Cell::new("-"),
            };
            recent.add_row(vec![
                Cell::new(format_timestamp(&item.coached_at)),
                Cell::new(truncate(&item.call_title, 30)),
                avg,
                Cell::new(truncate(&item.summary, 50)),
            ]);
        }
        println!();
        println!("  {}", style("Recent coaching").bold());
        println!("{recent}");
    }
    println!();
    Ok(())
}
