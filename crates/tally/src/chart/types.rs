//! Chart requests and the renderer-agnostic specs built from them.

use serde::{Deserialize, Serialize};

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Pie,
    Histogram,
    Box,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::Box,
        ChartKind::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Histogram => "histogram",
            ChartKind::Box => "box",
            ChartKind::Heatmap => "heatmap",
        }
    }

    /// Whether the chart plots a y column.
    pub fn needs_y(&self) -> bool {
        !matches!(self, ChartKind::Histogram | ChartKind::Heatmap)
    }

    /// Whether the chart plots an x column.
    pub fn needs_x(&self) -> bool {
        !matches!(self, ChartKind::Heatmap)
    }
}

impl std::str::FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(ChartKind::Bar),
            "line" => Ok(ChartKind::Line),
            "scatter" => Ok(ChartKind::Scatter),
            "pie" => Ok(ChartKind::Pie),
            "histogram" | "hist" => Ok(ChartKind::Histogram),
            "box" => Ok(ChartKind::Box),
            "heatmap" => Ok(ChartKind::Heatmap),
            _ => Err(format!(
                "Unknown chart kind: {}. Use bar, line, scatter, pie, histogram, box, or heatmap.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column selections for one chart.
///
/// For a pie chart `x` names the slices and `y` holds their values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            color: None,
            size: None,
        }
    }

    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    pub fn color(mut self, column: impl Into<String>) -> Self {
        self.color = Some(column.into());
        self
    }

    pub fn size(mut self, column: impl Into<String>) -> Self {
        self.size = Some(column.into());
        self
    }
}

/// Data behind a chart, in the shape its kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    /// One record per table row, restricted to the selected columns.
    /// Numeric cells are numbers, other cells strings, missing cells null.
    Records {
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    },
    /// Slice labels and their summed values.
    Slices { labels: Vec<String>, values: Vec<f64> },
    /// Square matrix indexed by `columns` on both axes.
    Matrix {
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    },
}

/// A fully resolved chart, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub data: ChartData,
}
