// SPDX-License-Identifier: MIT

//! Text/JSON rendering shared across `list`, `status`, and `warmup
//! status`. `--json` emits a stable record.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a list as a text table or JSON. Handles the empty-list message
/// and the format branch so command handlers only build rows.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    render_text: impl FnOnce(&[T]),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", empty_msg);
            } else {
                render_text(items);
            }
        }
    }
    Ok(())
}

/// Format-branch helper for non-list commands (`status`, `warmup status`).
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn();
        }
    }
    Ok(())
}

/// `list`'s one stable per-container record.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerRecord {
    pub name: String,
    pub profile_id: String,
    pub running: bool,
}

pub fn print_container_table(rows: &[ContainerRecord]) {
    println!("{:<28} {:<16} {}", crate::color::context("NAME"), crate::color::context("PROFILE"), crate::color::context("STATE"));
    for row in rows {
        let state = if row.running { crate::color::success("running") } else { crate::color::muted("stopped") };
        println!("{:<28} {:<16} {}", crate::color::literal(&row.name), row.profile_id, state);
    }
}

/// `status`'s one stable per-profile record.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord {
    pub profile_id: String,
    pub auth_ok: bool,
    pub auth_error: Option<String>,
    pub five_hour_remaining_pct: Option<f64>,
    pub weekly_remaining_pct: Option<f64>,
    pub weekly_reset_label: Option<String>,
}

pub fn print_status_table(rows: &[StatusRecord]) {
    for row in rows {
        let header = crate::color::header(&row.profile_id);
        if !row.auth_ok {
            let err = row.auth_error.as_deref().unwrap_or("unknown auth error");
            println!("{header}: {}", crate::color::error(err));
            continue;
        }
        match (row.five_hour_remaining_pct, row.weekly_remaining_pct, &row.weekly_reset_label) {
            (Some(five), Some(weekly), Some(label)) => {
                println!("{header}: 5h {:.1}% remaining, weekly {:.1}% remaining ({label})", five, weekly);
            }
            _ => {
                println!("{header}: {}", crate::color::muted("usage unavailable"));
            }
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
