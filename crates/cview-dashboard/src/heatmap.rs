//! Heat-map cells for the latency matrix.
//!
//! Raw RTTs are microseconds; the heat-map shows milliseconds. A zero cell
//! means no measurement and is drawn apart from the color scale.

use ratatui::style::Color;

use cview_state::LatencyMatrix;

pub const RTT_UNITS_PER_MS: f64 = 1_000.0;

/// Cool to hot.
pub const HEAT_PALETTE: [Color; 5] = [
    Color::Green,
    Color::LightGreen,
    Color::Yellow,
    Color::LightRed,
    Color::Red,
];

pub const NO_DATA_COLOR: Color = Color::DarkGray;

pub fn rtt_to_ms(raw: u64) -> f64 {
    raw as f64 / RTT_UNITS_PER_MS
}

/// Milliseconds with two decimals, `-` for an empty cell.
pub fn format_rtt(raw: u64) -> String {
    if raw == 0 {
        "-".to_string()
    } else {
        format!("{:.2}", rtt_to_ms(raw))
    }
}

/// Palette index of `value` scaled against `max`, `None` for empty cells.
pub fn heat_level(value: u64, max: u64) -> Option<usize> {
    if value == 0 || max == 0 {
        return None;
    }
    let top = HEAT_PALETTE.len() - 1;
    let ratio = value.min(max) as f64 / max as f64;
    Some(((ratio * top as f64).round() as usize).min(top))
}

pub fn heat_color(level: Option<usize>) -> Color {
    level
        .and_then(|l| HEAT_PALETTE.get(l).copied())
        .unwrap_or(NO_DATA_COLOR)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub text: String,
    pub color: Color,
}

/// One labeled row of rendered cells per matrix row.
pub fn heat_rows(matrix: &LatencyMatrix) -> Vec<(String, Vec<HeatCell>)> {
    let max = matrix.max_value();
    matrix
        .rows()
        .map(|(label, values)| {
            let cells = values
                .iter()
                .map(|&v| HeatCell {
                    text: format_rtt(v),
                    color: heat_color(heat_level(v, max)),
                })
                .collect();
            (label.to_string(), cells)
        })
        .collect()
}

/// Shorten a node name to `width` characters, keeping the tail which
/// usually tells nodes apart.
pub fn truncate_label(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width || width < 4 {
        return name.to_string();
    }
    let tail: String = name.chars().skip(count - (width - 1)).collect();
    format!("…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cview_state::build_latency_matrix;
    use cview_types::{NodeIPLatencyEntry, NodeIPLatencyStatsInfo};

    #[test]
    fn converts_to_milliseconds() {
        assert_eq!(format_rtt(1500), "1.50");
        assert_eq!(format_rtt(250), "0.25");
        assert_eq!(format_rtt(0), "-");
        assert!((rtt_to_ms(12_345) - 12.345).abs() < f64::EPSILON);
    }

    #[test]
    fn levels_scale_against_max() {
        assert_eq!(heat_level(0, 100), None);
        assert_eq!(heat_level(5, 0), None);
        assert_eq!(heat_level(100, 100), Some(4));
        assert_eq!(heat_level(50, 100), Some(2));
        assert_eq!(heat_level(1, 100), Some(0));
        assert_eq!(heat_color(None), NO_DATA_COLOR);
        assert_eq!(heat_color(Some(4)), Color::Red);
    }

    #[test]
    fn rows_follow_matrix() {
        let m = build_latency_matrix(&[
            NodeIPLatencyStatsInfo::new("A", vec![NodeIPLatencyEntry::new("B", 1500)]),
            NodeIPLatencyStatsInfo::new("B", vec![]),
        ]);
        let rows = heat_rows(&m);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "A");
        assert_eq!(rows[0].1[1].text, "1.50");
        assert_eq!(rows[0].1[1].color, Color::Red);
        assert_eq!(rows[1].1[0].color, NO_DATA_COLOR);
    }

    #[test]
    fn label_truncation_keeps_tail() {
        assert_eq!(truncate_label("node-1", 10), "node-1");
        assert_eq!(truncate_label("worker-node-long-17", 8), "…long-17");
        assert_eq!(truncate_label("worker-node-long-17", 8).chars().count(), 8);
    }
}
