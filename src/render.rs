use analytics::{MetricsResult, SymbolMetrics};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

/// Which of the three reports the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// CMP, ATH and the difference between them.
    Drawdown,
    /// CMP and the EMA set.
    Ema,
    /// Everything.
    Metrics,
}

impl View {
    fn shows_drawdown(self) -> bool {
        matches!(self, View::Drawdown | View::Metrics)
    }

    fn shows_emas(self) -> bool {
        matches!(self, View::Ema | View::Metrics)
    }
}

fn money(value: Decimal) -> String {
    format!("Rs.{:.2}", value.round_dp(2))
}

fn percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Renders successes as a table followed by one line per failed symbol.
pub fn render_table(results: &[MetricsResult], view: View, periods: &[usize]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec!["NSE Code".to_string(), "Current Price (CMP)".to_string()];
    if view.shows_drawdown() {
        header.push("All-Time High (ATH)".to_string());
        header.push("ATH Date".to_string());
        header.push("CMP vs ATH".to_string());
    }
    if view.shows_emas() {
        header.extend(periods.iter().map(|p| format!("{p}-day EMA")));
    }
    header.push("As Of".to_string());
    table.set_header(header);

    let successes: Vec<&SymbolMetrics> = results.iter().filter_map(MetricsResult::metrics).collect();
    for metrics in &successes {
        let mut row = vec![
            Cell::new(metrics.symbol.as_str()),
            right(money(metrics.current_price)),
        ];
        if view.shows_drawdown() {
            row.push(right(money(metrics.all_time_high)));
            row.push(Cell::new(metrics.ath_date.to_string()));
            row.push(right(percent(metrics.drawdown_pct)));
        }
        if view.shows_emas() {
            for period in periods {
                let value = metrics
                    .emas
                    .get(period)
                    .map(|ema| money(*ema))
                    .unwrap_or_else(|| "-".to_string());
                row.push(right(value));
            }
        }
        row.push(Cell::new(metrics.as_of.to_string()));
        table.add_row(row);
    }

    let mut out = String::new();
    if !successes.is_empty() {
        out.push_str(&table.to_string());
        out.push('\n');
    }
    for result in results {
        if let MetricsResult::Failure { symbol, reason } = result {
            out.push_str(&format!("Error fetching data for '{symbol}': {reason}\n"));
        }
    }
    out
}

pub fn render_json(results: &[MetricsResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
