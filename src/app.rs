use eframe::egui;

use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::plot::PlotView;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustySpectraApp {
    pub state: AppState,
    view: PlotView,
}

impl RustySpectraApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(config),
            view: PlotView::default(),
        }
    }
}

impl Default for RustySpectraApp {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl eframe::App for RustySpectraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: informational summaries ----
        egui::TopBottomPanel::bottom("console")
            .default_height(140.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::console(ui, &self.state);
            });

        // ---- Left side panel: records and transforms ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectral_plot(ui, &mut self.state, &mut self.view);
        });
    }
}
