use colored::Colorize;

use crate::domain::{RatingHistoryEntry, TimeControl};

const PLOT_ROWS: usize = 9;

/// Coordinate sequence for one time control. History entries only store
/// before/after pairs; the series re-creates the continuous trajectory by
/// leading with the first entry's `rating_before`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSeries {
    pub time_control: TimeControl,
    pub labels: Vec<String>,
    pub points: Vec<i32>,
}

impl RatingSeries {
    /// Build the series for one time control, None when the player has no
    /// games there. For n entries the series has n + 1 points.
    pub fn build(history: &[RatingHistoryEntry], time_control: TimeControl) -> Option<RatingSeries> {
        let filtered: Vec<&RatingHistoryEntry> = history
            .iter()
            .filter(|entry| entry.time_control == time_control)
            .collect();

        let first = filtered.first()?;

        let mut labels = vec!["início".to_string()];
        let mut points = vec![first.rating_before];
        for entry in &filtered {
            labels.push(entry.created_at.format("%d/%m").to_string());
            points.push(entry.rating_after);
        }

        Some(RatingSeries {
            time_control,
            labels,
            points,
        })
    }
}

/// A rendered chart bound to the terminal surface.
#[derive(Debug)]
pub struct LineChart {
    series: RatingSeries,
}

impl LineChart {
    fn new(series: RatingSeries) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &RatingSeries {
        &self.series
    }

    /// Plot the trajectory as rows of the terminal.
    pub fn draw(&self) -> String {
        let points = &self.series.points;
        let min = points.iter().min().copied().unwrap_or(0);
        let max = points.iter().max().copied().unwrap_or(0);
        let span = (max - min).max(1) as f64;

        let rows: Vec<usize> = points
            .iter()
            .map(|&p| {
                let normalized = (p - min) as f64 / span;
                ((PLOT_ROWS - 1) as f64 * normalized).round() as usize
            })
            .collect();

        let mut out = String::new();
        for row in (0..PLOT_ROWS).rev() {
            let label = if row == PLOT_ROWS - 1 {
                format!("{:>5}", max)
            } else if row == 0 {
                format!("{:>5}", min)
            } else {
                "     ".to_string()
            };
            out.push_str(&label);
            out.push_str(" │ ");
            for &point_row in &rows {
                if point_row == row {
                    out.push_str(&"●".green().to_string());
                } else if point_row > row {
                    out.push_str(&"·".dimmed().to_string());
                } else {
                    out.push(' ');
                }
                out.push(' ');
            }
            out.push('\n');
        }

        out.push_str("      └─");
        out.push_str(&"──".repeat(points.len()));
        out.push('\n');
        if let (Some(first), Some(last)) = (self.series.labels.first(), self.series.labels.last()) {
            out.push_str(&format!(
                "        {}{:>width$}\n",
                first,
                last,
                width = (points.len() * 2).saturating_sub(first.chars().count()).max(1)
            ));
        }
        out
    }
}

/// Owner of at most one live chart. The prior instance is destroyed on
/// every re-render path, including the empty-state path, so a surface is
/// never bound to two charts.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<LineChart>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render for a time control from the already-fetched history.
    /// Returns the mounted chart, or None (slot cleared) when the
    /// filtered series is empty.
    pub fn render(
        &mut self,
        history: &[RatingHistoryEntry],
        time_control: TimeControl,
    ) -> Option<&LineChart> {
        self.clear();
        let series = RatingSeries::build(history, time_control)?;
        self.current = Some(LineChart::new(series));
        self.current.as_ref()
    }

    /// Destroy the mounted chart, if any.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn mounted(&self) -> Option<&LineChart> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(before: i32, after: i32, tc: TimeControl, day: u32) -> RatingHistoryEntry {
        RatingHistoryEntry {
            rating_before: before,
            rating_after: after,
            delta: after - before,
            time_control: tc,
            created_at: Utc.with_ymd_and_hms(2025, 4, day, 20, 0, 0).unwrap(),
            match_id: None,
        }
    }

    #[test]
    fn series_has_one_more_point_than_entries() {
        let history = vec![
            entry(1400, 1412, TimeControl::Rapid, 1),
            entry(1412, 1405, TimeControl::Rapid, 8),
            entry(1405, 1420, TimeControl::Rapid, 15),
        ];
        let series = RatingSeries::build(&history, TimeControl::Rapid).unwrap();
        assert_eq!(series.points.len(), 4);
        assert_eq!(series.points[0], 1400);
        assert_eq!(series.points[1..], [1412, 1405, 1420]);
        assert_eq!(series.labels.len(), 4);
        assert_eq!(series.labels[0], "início");
    }

    #[test]
    fn series_filters_by_time_control() {
        let history = vec![
            entry(1400, 1412, TimeControl::Rapid, 1),
            entry(1200, 1215, TimeControl::Blitz, 2),
        ];
        let blitz = RatingSeries::build(&history, TimeControl::Blitz).unwrap();
        assert_eq!(blitz.points, [1200, 1215]);
        assert!(RatingSeries::build(&history, TimeControl::Standard).is_none());
    }

    #[test]
    fn slot_holds_at_most_one_chart() {
        let history = vec![entry(1400, 1412, TimeControl::Rapid, 1)];
        let mut slot = ChartSlot::new();

        assert!(slot.render(&history, TimeControl::Rapid).is_some());
        assert!(slot.mounted().is_some());

        // Switching to an empty time control destroys the prior chart.
        assert!(slot.render(&history, TimeControl::Standard).is_none());
        assert!(slot.mounted().is_none());

        // Re-rendering the same control replaces rather than stacks.
        slot.render(&history, TimeControl::Rapid);
        slot.render(&history, TimeControl::Rapid);
        assert!(slot.mounted().is_some());
    }

    #[test]
    fn draw_produces_axis_and_plot() {
        let history = vec![
            entry(1400, 1450, TimeControl::Rapid, 1),
            entry(1450, 1430, TimeControl::Rapid, 8),
        ];
        let mut slot = ChartSlot::new();
        let chart = slot.render(&history, TimeControl::Rapid).unwrap();
        let drawing = chart.draw();
        assert!(drawing.contains("1450"));
        assert!(drawing.contains("1400"));
        assert!(drawing.contains("início"));
    }
}
