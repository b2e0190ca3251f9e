use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotBounds, PlotPoints, VLine};

use crate::color::{action_color, marker_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// View bookkeeping kept across frames.
#[derive(Debug, Default)]
pub struct PlotView {
    /// Figure whose bounds were last applied.
    shown: Option<usize>,
    reset: bool,
}

/// Figure tabs plus the current figure.
pub fn spectral_plot(ui: &mut Ui, state: &mut AppState, view: &mut PlotView) {
    if state.figures.figures.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a FITS spectrum to begin  (File → Open spectrum…)");
        });
        return;
    }

    figure_tabs(ui, state, view);
    ui.separator();

    let (Some(index), Some(figure)) = (state.figures.current, state.figures.current_figure())
    else {
        return;
    };

    let apply_bounds = view.reset || view.shown != Some(index);
    view.shown = Some(index);
    view.reset = false;
    let (x, y) = figure.bounds();

    ui.label(&figure.title);
    Plot::new(("figure", index))
        .legend(egui_plot::Legend::default())
        .x_axis_label(figure.x_label.clone())
        .y_axis_label(figure.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &figure.series {
                let points: PlotPoints = series.points.iter().copied().collect();
                let line = Line::new(points)
                    .name(&series.name)
                    .color(action_color(series.action))
                    .width(1.5);
                plot_ui.line(line);
            }

            for marker in &figure.markers {
                plot_ui.vline(
                    VLine::new(marker.x)
                        .name(&marker.label)
                        .color(marker_color())
                        .width(1.0),
                );
            }

            if apply_bounds {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x[0], y[0]], [x[1], y[1]]));
            }
        });
}

/// One selectable label per figure, newest last, plus view controls.
fn figure_tabs(ui: &mut Ui, state: &mut AppState, view: &mut PlotView) {
    let titles: Vec<String> = state
        .figures
        .figures
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}: {}", i + 1, f.title))
        .collect();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, title) in titles.iter().enumerate() {
            let selected = state.figures.current == Some(i);
            if ui.selectable_label(selected, title).clicked() {
                state.figures.current = Some(i);
            }
        }
        ui.separator();
        if ui.small_button("Reset view").clicked() {
            view.reset = true;
        }
        if ui
            .small_button("Clear figures")
            .on_hover_text("Close every figure")
            .clicked()
        {
            state.figures.clear();
            view.shown = None;
        }
    });

    if state.figures.figures.is_empty() {
        ui.colored_label(Color32::GRAY, "No figures.");
    }
}
