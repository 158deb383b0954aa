use colored::Colorize;
use serde_json::Value;

use super::result_of;

const PLOT_HEIGHT: usize = 12;
const PLOT_WIDTH: usize = 60;
const MAX_SPACING: usize = 6;

/// Series colour (#FF6B6B).
const SERIES_RGB: (u8, u8, u8) = (255, 107, 107);
/// Reference line colour (#4ECDC4).
const REFERENCE_RGB: (u8, u8, u8) = (78, 205, 196);

#[derive(Clone, Copy, PartialEq)]
enum Cell {
    Blank,
    Reference,
    Point,
}

/// Plot the solver's convergence history as an ASCII chart.
///
/// x is the iteration index, y is the yield estimate, and a dashed line marks
/// the final yield. Results without a history fall back to the table view.
pub fn print_chart(value: &Value) {
    match render_chart(value, true) {
        Some(chart) => print!("{}", chart),
        None => super::table::print_table(value),
    }
}

pub(crate) fn render_chart(value: &Value, colorize: bool) -> Option<String> {
    let result = result_of(value);
    let history = result.get("history")?.as_array()?;
    let points: Vec<f64> = history
        .iter()
        .map(|p| as_f64(&p["yield_rate"]))
        .collect::<Option<_>>()?;
    if points.is_empty() {
        return None;
    }
    let final_yield = result.get("ytm").and_then(as_f64).unwrap_or(points[points.len() - 1]);
    let label = result
        .get("ytm_pct")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:.4}%", final_yield * 100.0));

    let (low, high) = value_range(&points, final_yield);
    let row_of = |v: f64| -> usize {
        let frac = (high - v) / (high - low);
        ((frac * (PLOT_HEIGHT - 1) as f64).round() as usize).min(PLOT_HEIGHT - 1)
    };

    let spacing = if points.len() > 1 {
        (PLOT_WIDTH / (points.len() - 1)).clamp(1, MAX_SPACING)
    } else {
        1
    };
    let width = (points.len() - 1) * spacing + 1;

    let mut grid = vec![vec![Cell::Blank; width]; PLOT_HEIGHT];
    let reference_row = row_of(final_yield);
    for (col, cell) in grid[reference_row].iter_mut().enumerate() {
        if col % 2 == 0 {
            *cell = Cell::Reference;
        }
    }
    for (i, v) in points.iter().enumerate() {
        grid[row_of(*v)][i * spacing] = Cell::Point;
    }

    let paint = |text: &str, rgb: (u8, u8, u8)| -> String {
        if colorize {
            text.truecolor(rgb.0, rgb.1, rgb.2).to_string()
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    out.push_str("YTM Solver Convergence\n\n");

    for (r, row) in grid.iter().enumerate() {
        let axis_label = if r == 0 {
            format!("{:>9.4}%", high * 100.0)
        } else if r == PLOT_HEIGHT - 1 {
            format!("{:>9.4}%", low * 100.0)
        } else if r == reference_row {
            format!("{:>9.4}%", final_yield * 100.0)
        } else {
            " ".repeat(10)
        };
        out.push_str(&axis_label);
        out.push_str(" │");
        for cell in row {
            match cell {
                Cell::Blank => out.push(' '),
                Cell::Reference => out.push_str(&paint("-", REFERENCE_RGB)),
                Cell::Point => out.push_str(&paint("●", SERIES_RGB)),
            }
        }
        out.push('\n');
    }

    out.push_str(&" ".repeat(11));
    out.push('└');
    out.push_str(&"─".repeat(width));
    out.push('\n');

    let last = points.len() - 1;
    let last_label = last.to_string();
    let gap = width.saturating_sub(1 + last_label.len());
    out.push_str(&" ".repeat(12));
    if last == 0 {
        out.push('0');
    } else {
        out.push('0');
        out.push_str(&" ".repeat(gap));
        out.push_str(&last_label);
    }
    out.push_str("\n            Iteration\n\n");

    out.push_str(&format!(
        "  {} YTM Convergence   {} YTM={}\n",
        paint("●", SERIES_RGB),
        paint("- -", REFERENCE_RGB),
        label
    ));

    Some(out)
}

fn value_range(points: &[f64], final_yield: f64) -> (f64, f64) {
    let mut low = final_yield;
    let mut high = final_yield;
    for v in points {
        low = low.min(*v);
        high = high.max(*v);
    }

    // Flat series (e.g. converged at the seed) still needs a visible band
    if high - low < 1e-9 {
        let pad = (high.abs() * 0.01).max(1e-4);
        low -= pad;
        high += pad;
    }
    (low, high)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
