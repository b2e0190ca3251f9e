//! Rendering context shared by the data layer and the UI.
//!
//! Operations never draw directly: they hand a finished [`Figure`] and their
//! informational text to a [`PlotSurface`] passed in by the caller.
//! [`FigureBook`] is the surface the application renders from.

use serde::{Deserialize, Serialize};

use crate::data::model::Action;

// ---------------------------------------------------------------------------
// Axis overrides
// ---------------------------------------------------------------------------

/// Per-call axis configuration; any field left `None` keeps the derived value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisOverrides {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub xr: Option<[f64; 2]>,
    pub yr: Option<[f64; 2]>,
    /// Overlay the flux as originally loaded.
    pub raw: bool,
}

impl AxisOverrides {
    /// Fields set on `self` win; unset ones fall back to `defaults`.
    pub fn or(&self, defaults: &AxisOverrides) -> AxisOverrides {
        AxisOverrides {
            title: self.title.clone().or_else(|| defaults.title.clone()),
            xlabel: self.xlabel.clone().or_else(|| defaults.xlabel.clone()),
            ylabel: self.ylabel.clone().or_else(|| defaults.ylabel.clone()),
            xr: self.xr.or(defaults.xr),
            yr: self.yr.or(defaults.yr),
            raw: self.raw || defaults.raw,
        }
    }

    pub fn apply(&self, figure: &mut Figure) {
        if let Some(title) = &self.title {
            figure.title = title.clone();
        }
        if let Some(xlabel) = &self.xlabel {
            figure.x_label = xlabel.clone();
        }
        if let Some(ylabel) = &self.ylabel {
            figure.y_label = ylabel.clone();
        }
        if let Some(xr) = self.xr {
            figure.x_range = Some(xr);
        }
        if let Some(yr) = self.yr {
            figure.y_range = Some(yr);
        }
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub action: Action,
    pub points: Vec<[f64; 2]>,
}

/// A vertical overlay marker (e.g. a catalog line position).
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub label: String,
}

/// A fully configured plot, independent of the toolkit that draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: Option<[f64; 2]>,
    pub y_range: Option<[f64; 2]>,
    pub series: Vec<Series>,
    pub markers: Vec<Marker>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            x_range: None,
            y_range: None,
            series: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Axis bounds to show: explicit ranges where set, data extent otherwise.
    ///
    /// The automatic y extent only considers points inside the x bounds, so a
    /// zoomed-in figure scales to what is visible.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let all_x = self.series.iter().flat_map(|s| s.points.iter().map(|p| p[0]));
        let x = self
            .x_range
            .or_else(|| crate::data::range::finite_extent(all_x))
            .unwrap_or([0.0, 1.0]);

        let y = self.y_range.unwrap_or_else(|| {
            let (lo, hi) = (x[0].min(x[1]), x[0].max(x[1]));
            let visible = self
                .series
                .iter()
                .flat_map(|s| s.points.iter())
                .filter(|p| p[0] >= lo && p[0] <= hi)
                .map(|p| p[1]);
            crate::data::range::finite_extent(visible).unwrap_or([0.0, 1.0])
        });
        (x, y)
    }
}

// ---------------------------------------------------------------------------
// PlotSurface – the rendering context handle
// ---------------------------------------------------------------------------

pub trait PlotSurface {
    /// Emit an informational summary.
    fn info(&mut self, text: &str);
    /// Open a new figure.
    fn figure(&mut self, figure: Figure);
}

/// In-memory surface: every figure and message, newest last.
#[derive(Debug, Default)]
pub struct FigureBook {
    pub figures: Vec<Figure>,
    pub console: Vec<String>,
    /// Index of the figure shown in the central panel.
    pub current: Option<usize>,
}

impl FigureBook {
    pub fn current_figure(&self) -> Option<&Figure> {
        self.current.and_then(|i| self.figures.get(i))
    }

    pub fn clear(&mut self) {
        self.figures.clear();
        self.current = None;
    }
}

impl PlotSurface for FigureBook {
    fn info(&mut self, text: &str) {
        log::info!("{text}");
        self.console.push(text.to_string());
    }

    fn figure(&mut self, figure: Figure) {
        self.figures.push(figure);
        self.current = Some(self.figures.len() - 1);
    }
}
