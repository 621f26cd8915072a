//! `callcoach models`: the static model registry.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use callcoach_types::llm::available_models;

#[derive(Serialize)]
struct ModelRow<'a> {
    id: &'a str,
    provider: &'a str,
    display_name: &'a str,
    default: bool,
}

pub fn list_models(default_model: &str, json: bool) -> Result<()> {
    let rows: Vec<ModelRow<'_>> = available_models()
        .iter()
        .map(|m| ModelRow {
            id: m.id,
            provider: m.provider.as_str(),
            display_name: m.display_name,
            default: m.id == default_model,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::White),
        Cell::new("Provider").fg(Color::White),
        Cell::new("Name").fg(Color::White),
    ]);
    for row in &rows {
        let id = if row.default {
            Cell::new(format!("{} (default)", row.id)).fg(Color::Cyan)
        } else {
            Cell::new(row.id)
        };
        table.add_row(vec![id, Cell::new(row.provider), Cell::new(row.display_name)]);
    }

    println!();
    println!("{table}");
    if !rows.iter().any(|r| r.default) {
        println!(
            "  {} configured default '{}' is not a known model",
            style("!").yellow().bold(),
            default_model
        );
    }
    println!();
    Ok(())
}
