//! Output Formatting and Display Management
//!
//! Renders a computed [`Report`] either as colored terminal tables or as JSON.
//! The renderer never re-aggregates or rounds stored values; cost rounding to
//! four decimals happens only in the text format.
//!
//! ### Text layout
//! - One row per group: key, models (short names), four token columns, total, cost
//! - Zero token counts print as `-`
//! - A TOTAL footer summing every column
//! - Breakdown reports print each group's per-model table before the summary
//! - Daily and monthly tables list oldest first; session tables list newest
//!   first unless ascending order is requested
//!
//! ### JSON layout
//! Rows serialize with camelCase keys (`inputTokens`, `costUSD`, ...) in
//! aggregation order; breakdown rows carry an extra `breakdown` array of
//! per-model rows.

use crate::models::*;
use crate::pricing::display_name;
use anyhow::Result;
use colored::Colorize;
use std::fmt::Write as _;

const TOKEN_HEADERS: [&str; 6] = ["Input", "Output", "Cache Create", "Cache Read", "Total", "Cost (USD)"];

// One rendered table row before coloring and padding.
struct Row {
    key: String,
    models: String,
    tokens: TokenUsage,
    cost_usd: f64,
}

impl Row {
    fn cells(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.models.clone(),
            format_count(self.tokens.input_tokens),
            format_count(self.tokens.output_tokens),
            format_count(self.tokens.cache_creation_tokens),
            format_count(self.tokens.cache_read_tokens),
            format_count(self.tokens.total()),
            format_cost(self.cost_usd),
        ]
    }
}

fn format_count(n: u64) -> String {
    if n == 0 {
        "-".to_string()
    } else {
        n.to_string()
    }
}

fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}

fn short_models(models: &[String]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for model in models {
        let name = display_name(model);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names.join(", ")
}

fn short_session_id(session_id: &str) -> String {
    match session_id.char_indices().nth(8) {
        Some((idx, _)) => format!("{}...", &session_id[..idx]),
        None => session_id.to_string(),
    }
}

fn daily_row(day: &DailyUsage) -> Row {
    Row {
        key: day.date.format("%Y-%m-%d").to_string(),
        models: short_models(&day.models),
        tokens: day.tokens,
        cost_usd: day.cost_usd,
    }
}

fn monthly_row(month: &MonthlyUsage) -> Row {
    Row {
        key: month.key().to_string(),
        models: short_models(&month.models),
        tokens: month.tokens,
        cost_usd: month.cost_usd,
    }
}

fn session_row(session: &SessionUsage) -> Row {
    Row {
        key: format!(
            "{}  {}",
            short_session_id(&session.session_id),
            session.start_time.format("%Y-%m-%d %H:%M")
        ),
        models: short_models(&session.models),
        tokens: session.tokens,
        cost_usd: session.cost_usd,
    }
}

fn model_row(model: &ModelBreakdown) -> Row {
    Row {
        key: display_name(&model.model).to_string(),
        models: model.model.clone(),
        tokens: model.tokens,
        cost_usd: model.cost_usd,
    }
}

pub struct ReportDisplay {
    json_pretty: bool,
}

impl Default for ReportDisplay {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportDisplay {
    pub fn new(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    /// Print the report to stdout.
    pub fn display(&self, kind: ReportKind, report: &Report, options: &ReportOptions) -> Result<()> {
        let rendered = if options.json_output {
            self.render_json(report)?
        } else {
            self.render_text(kind, report, options.ascending)
        };
        println!("{}", rendered);
        Ok(())
    }

    pub fn render_json(&self, report: &Report) -> Result<String> {
        let json = if self.json_pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    pub fn render_text(&self, kind: ReportKind, report: &Report, ascending: bool) -> String {
        if report.is_empty() {
            return "No usage data found.".to_string();
        }

        let newest_first;
        let report = match report {
            Report::Session(_) | Report::SessionBreakdown(_) if !ascending => {
                let mut reordered = report.clone();
                reordered.reverse();
                newest_first = reordered;
                &newest_first
            }
            _ => report,
        };

        let key_header = match kind {
            ReportKind::Daily => "Date",
            ReportKind::Monthly => "Month",
            ReportKind::Session => "Session / Start",
            ReportKind::Models => "Model",
        };
        let models_header = if kind == ReportKind::Models { "Model ID" } else { "Models" };

        let mut out = String::new();
        match report {
            Report::Daily(days) => {
                let rows: Vec<Row> = days.iter().map(daily_row).collect();
                render_table(&mut out, key_header, models_header, &rows);
            }
            Report::Monthly(months) => {
                let rows: Vec<Row> = months.iter().map(monthly_row).collect();
                render_table(&mut out, key_header, models_header, &rows);
            }
            Report::Session(sessions) => {
                let rows: Vec<Row> = sessions.iter().map(session_row).collect();
                render_table(&mut out, key_header, models_header, &rows);
            }
            Report::Models(models) => {
                let rows: Vec<Row> = models.iter().map(model_row).collect();
                render_table(&mut out, key_header, models_header, &rows);
            }
            Report::DailyBreakdown(groups) => {
                for group in groups {
                    let title = group.usage.date.format("%Y-%m-%d").to_string();
                    render_breakdown(&mut out, "Date:", &title, &group.breakdown);
                }
                let rows: Vec<Row> = groups.iter().map(|g| daily_row(&g.usage)).collect();
                render_summary(&mut out, key_header, models_header, &rows);
            }
            Report::MonthlyBreakdown(groups) => {
                for group in groups {
                    let title = group.usage.key().to_string();
                    render_breakdown(&mut out, "Month:", &title, &group.breakdown);
                }
                let rows: Vec<Row> = groups.iter().map(|g| monthly_row(&g.usage)).collect();
                render_summary(&mut out, key_header, models_header, &rows);
            }
            Report::SessionBreakdown(groups) => {
                for group in groups {
                    let title = format!(
                        "{} ({} - {})",
                        group.usage.session_id,
                        group.usage.start_time.format("%Y-%m-%d %H:%M"),
                        group.usage.end_time.format("%H:%M")
                    );
                    render_breakdown(&mut out, "Session:", &title, &group.breakdown);
                }
                let rows: Vec<Row> = groups.iter().map(|g| session_row(&g.usage)).collect();
                render_summary(&mut out, key_header, models_header, &rows);
            }
        }
        out
    }
}

fn render_breakdown(out: &mut String, label: &str, title: &str, models: &[ModelBreakdown]) {
    let _ = writeln!(out, "\n{} {}", label.cyan().bold(), title.bright_white().bold());
    let rows: Vec<Row> = models.iter().map(model_row).collect();
    write_rows(out, "Model", "Model ID", &rows, false);
}

fn render_summary(out: &mut String, key_header: &str, models_header: &str, rows: &[Row]) {
    let _ = writeln!(out, "\n{}", "═".repeat(80).bright_cyan());
    render_table(out, key_header, models_header, rows);
}

fn render_table(out: &mut String, key_header: &str, models_header: &str, rows: &[Row]) {
    write_rows(out, key_header, models_header, rows, true);
}

fn write_rows(out: &mut String, key_header: &str, models_header: &str, rows: &[Row], footer: bool) {
    let mut header: Vec<String> = vec![key_header.to_string(), models_header.to_string()];
    header.extend(TOKEN_HEADERS.iter().map(|h| h.to_string()));

    let body: Vec<Vec<String>> = rows.iter().map(Row::cells).collect();

    let total = rows.iter().fold(
        Row {
            key: "TOTAL".to_string(),
            models: String::new(),
            tokens: TokenUsage::default(),
            cost_usd: 0.0,
        },
        |mut acc, row| {
            acc.tokens += row.tokens;
            acc.cost_usd += row.cost_usd;
            acc
        },
    );
    let footer_cells = total.cells();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in body.iter().chain(footer.then_some(&footer_cells)) {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let _ = writeln!(out, "{}", pad_line(&header, &widths).cyan().bold());
    let rule_width = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
    let _ = writeln!(out, "{}", "─".repeat(rule_width).bright_black());

    for cells in &body {
        let line = pad_line(cells, &widths);
        let cost_start = line.len() - widths[widths.len() - 1];
        let _ = writeln!(out, "{}{}", &line[..cost_start], line[cost_start..].green());
    }

    if footer {
        let _ = writeln!(out, "{}", "─".repeat(rule_width).bright_black());
        let _ = writeln!(out, "{}", pad_line(&footer_cells, &widths).yellow().bold());
    }
}

// Key and models columns align left, numeric columns align right.
fn pad_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            let pad = width.saturating_sub(cell.chars().count());
            if i < 2 {
                format!("{}{}", cell, " ".repeat(pad))
            } else {
                format!("{}{}", " ".repeat(pad), cell)
            }
        })
        .collect::<Vec<_>>()
        .join(" │ ")
}
