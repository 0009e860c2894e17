//! Plot-ready line data.
//!
//! No drawing happens here: a recording becomes one `(t, value)` line per
//! feature column, ready for whatever plotting front end consumes it.

use crate::error::Result;
use crate::sequence::Signal;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One polyline, `t` on the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotLine {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// A single set of axes with any number of overlaid lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlotData {
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<PlotLine>,
}

impl PlotData {
    pub fn new(y_label: &str, lines: Vec<PlotLine>) -> Self {
        Self {
            x_label: "t".to_string(),
            y_label: y_label.to_string(),
            lines,
        }
    }

    /// Add another recording's lines onto the same axes.
    pub fn overlay(&mut self, other: PlotData, member: usize) {
        if self.lines.is_empty() {
            self.x_label = other.x_label;
            self.y_label = other.y_label;
        }
        self.lines.extend(other.lines.into_iter().map(|mut line| {
            line.label = format!("{}[{member}]", line.label);
            line
        }));
    }

    pub fn n_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// One line per column of `signal`, with the sample index as `t`.
pub(crate) fn signal_lines(signal: &Signal, name: &str) -> Vec<PlotLine> {
    let values = signal.values();
    values
        .columns()
        .into_iter()
        .enumerate()
        .map(|(col, column)| PlotLine {
            label: if signal.is_scalar() {
                name.to_string()
            } else {
                format!("{name}{col}")
            },
            points: column
                .iter()
                .enumerate()
                .map(|(t, &v)| (t as f64, v))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_one_line_per_column() {
        let signal = Signal::vector(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let lines = signal_lines(&signal, "y");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].label, "y1");
        assert_eq!(lines[1].points, vec![(0.0, 2.0), (1.0, 4.0), (2.0, 6.0)]);
    }

    #[test]
    fn test_overlay_labels_members() {
        let member = PlotData::new("y", signal_lines(&Signal::from(vec![1.0]), "y"));
        let mut combined = PlotData::default();
        combined.overlay(member.clone(), 0);
        combined.overlay(member, 1);
        assert_eq!(combined.n_lines(), 2);
        assert_eq!(combined.x_label, "t");
        assert_eq!(combined.lines[0].label, "y[0]");
        assert_eq!(combined.lines[1].label, "y[1]");
    }
}
