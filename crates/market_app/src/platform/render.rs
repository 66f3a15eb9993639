use market_core::{AppViewModel, ModuleRecord, QueryMode};
use serde::Serialize;

/// Extraction strips currency words so one unit is appended here.
const PRICE_UNIT: &str = "Caliber";

fn status_line(view: &AppViewModel) -> String {
    if view.stopped {
        "stopped".to_string()
    } else if let Some(error) = &view.error {
        format!("failed: {error}")
    } else if view.finished {
        "finished".to_string()
    } else {
        "running".to_string()
    }
}

fn price_cell(record: &ModuleRecord) -> String {
    if record.price.is_empty() {
        "-".to_string()
    } else {
        format!("{} {PRICE_UNIT}", record.price)
    }
}

fn opt_cell(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn row(record: &ModuleRecord, mode: QueryMode) -> Vec<String> {
    let mut cells = vec![
        record.name.clone(),
        price_cell(record),
        opt_cell(record.platform.as_deref()),
    ];
    if mode == QueryMode::Ancestor {
        cells.push(opt_cell(record.required_rank.as_deref()));
        cells.push(opt_cell(record.reroll_count.as_deref()));
    }
    cells.push(opt_cell(record.seller_name.as_deref()));
    cells.push(opt_cell(record.seller_status.as_deref()));
    cells.push(opt_cell(record.reg_date.as_deref()));
    cells.push(
        record
            .attributes
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    );
    cells
}

fn header(mode: QueryMode) -> Vec<String> {
    let mut cells = vec!["Name", "Price", "Platform"];
    if mode == QueryMode::Ancestor {
        cells.extend(["Rank", "Rerolls"]);
    }
    cells.extend(["Seller", "Status", "Listed", "Attributes"]);
    cells.into_iter().map(str::to_string).collect()
}

/// Plain-text table of the visible records with a one-line summary.
pub fn render_table(view: &AppViewModel, limit: Option<usize>, fetched: &str) -> String {
    let shown = limit.unwrap_or(view.records.len()).min(view.records.len());
    let mut out = format!(
        "{} of {} listings ({} mode, {}) at {}",
        view.records.len(),
        view.total_count,
        view.mode.label(),
        status_line(view),
        fetched
    );
    if let Some(profile) = &view.selected_profile {
        let marker = if view.save_enabled { " (modified)" } else { "" };
        out.push_str(&format!("\nprofile: {profile}{marker}"));
    }
    if view.records.is_empty() {
        return out;
    }

    let mut rows = vec![header(view.mode)];
    rows.extend(view.records[..shown].iter().map(|r| row(r, view.mode)));

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .map(|cells| cells[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for cells in &rows {
        out.push('\n');
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
    }
    if shown < view.records.len() {
        out.push_str(&format!("\n... {} more", view.records.len() - shown));
    }
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonView<'a> {
    mode: &'static str,
    total_count: usize,
    finished: bool,
    stopped: bool,
    error: Option<&'a str>,
    records: &'a [ModuleRecord],
}

pub fn render_json(view: &AppViewModel) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonView {
        mode: view.mode.label(),
        total_count: view.total_count,
        finished: view.finished,
        stopped: view.stopped,
        error: view.error.as_deref(),
        records: &view.records,
    })
}
