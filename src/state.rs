use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::ViewerConfig;
use crate::data::lines::LineCatalog;
use crate::data::loader::{load_spectrum, LoadOptions};
use crate::data::model::{Extension, SpectralRecord};
use crate::data::smooth::WindowShape;
use crate::data::transform::DisplayOptions;
use crate::figure::{AxisOverrides, FigureBook};

// ---------------------------------------------------------------------------
// Form state – what the side panel edits
// ---------------------------------------------------------------------------

/// User-editable inputs for loading and transforming.  Text fields left
/// empty mean "no override".
#[derive(Debug, Clone)]
pub struct TransformForm {
    /// HDU index or `EXTNAME`.
    pub extension: String,
    pub row: usize,
    pub smoothing_length: usize,
    pub window: WindowShape,
    /// Index into `AppState::records` subtracted from the selection.
    pub subtract_target: Option<usize>,
    pub line_name: String,
    pub noplot: bool,
    pub quiet: bool,
    /// Overlay the loaded flux on every new figure.
    pub show_raw: bool,
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    /// `"min, max"`.
    pub xr: String,
    pub yr: String,
}

impl TransformForm {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let window = config.defaults.window.parse::<WindowShape>().unwrap_or_else(|e| {
            log::warn!("{e}; falling back to boxcar");
            WindowShape::Boxcar
        });
        Self {
            extension: config.defaults.extension.to_string(),
            row: config.defaults.row,
            smoothing_length: config.defaults.smoothing_length,
            window,
            subtract_target: None,
            line_name: String::new(),
            noplot: false,
            quiet: false,
            show_raw: false,
            title: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            xr: String::new(),
            yr: String::new(),
        }
    }

    pub fn overrides(&self) -> Result<AxisOverrides> {
        Ok(AxisOverrides {
            title: non_empty(&self.title),
            xlabel: non_empty(&self.xlabel),
            ylabel: non_empty(&self.ylabel),
            xr: parse_range(&self.xr).context("x range")?,
            yr: parse_range(&self.yr).context("y range")?,
            raw: self.show_raw,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Parse `"lo, hi"` (comma or whitespace separated); empty means unset.
pub fn parse_range(s: &str) -> Result<Option<[f64; 2]>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let [lo, hi] = parts.as_slice() else {
        bail!("expected two numbers, got '{s}'");
    };
    let lo: f64 = lo.parse().with_context(|| format!("'{lo}' is not a number"))?;
    let hi: f64 = hi.parse().with_context(|| format!("'{hi}' is not a number"))?;
    if !lo.is_finite() || !hi.is_finite() {
        bail!("range bounds must be finite, got '{s}'");
    }
    if lo >= hi {
        bail!("range minimum must be below maximum, got '{s}'");
    }
    Ok(Some([lo, hi]))
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded and derived spectra, in creation order.
    pub records: Vec<SpectralRecord>,

    /// Record the transform controls act on.
    pub selected: Option<usize>,

    /// Rendering context every operation draws into.
    pub figures: FigureBook,

    pub catalog: Option<LineCatalog>,

    pub form: TransformForm,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let mut state = Self {
            form: TransformForm::from_config(&config),
            config,
            records: Vec::new(),
            selected: None,
            figures: FigureBook::default(),
            catalog: None,
            status_message: None,
        };
        if let Some(path) = state.config.line_catalog.clone() {
            let result = state.open_catalog(&path);
            state.report(result);
        }
        state
    }

    /// Log a failed operation and surface it in the status bar.
    pub fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn display_options(&self) -> Result<DisplayOptions> {
        Ok(DisplayOptions {
            noplot: self.form.noplot,
            quiet: self.form.quiet,
            axes: self.form.overrides()?.or(&self.config.axes),
        })
    }

    pub fn selected_record(&self) -> Option<&SpectralRecord> {
        self.selected.and_then(|i| self.records.get(i))
    }

    pub fn select_record(&mut self, index: usize) {
        if index < self.records.len() {
            self.selected = Some(index);
        }
    }

    fn push_record(&mut self, record: SpectralRecord) {
        self.records.push(record);
        self.selected = Some(self.records.len() - 1);
    }

    fn selected_index(&self) -> Result<usize> {
        self.selected
            .filter(|&i| i < self.records.len())
            .context("No spectrum selected")
    }

    // -- Operations --

    pub fn open_spectrum(&mut self, path: &Path) -> Result<()> {
        let display = self.display_options()?;
        let mut options = LoadOptions::from_config(&self.config);
        options.extension = Extension::from(self.form.extension.as_str());
        options.row = self.form.row;

        let record = load_spectrum(path, &options, &display, &mut self.figures)
            .with_context(|| format!("loading {}", path.display()))?;
        self.push_record(record);
        Ok(())
    }

    pub fn open_catalog(&mut self, path: &Path) -> Result<()> {
        let catalog = LineCatalog::from_path(path)
            .with_context(|| format!("loading line catalog {}", path.display()))?;
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Selected minus `form.subtract_target`.
    pub fn subtract_selected(&mut self) -> Result<()> {
        let display = self.display_options()?;
        let left = self.selected_index()?;
        let right = self
            .form
            .subtract_target
            .filter(|&i| i < self.records.len())
            .context("No spectrum chosen to subtract")?;

        let out = self.records[left]
            .subtract(&self.records[right], &display, &mut self.figures)
            .context("subtracting spectra")?;
        self.push_record(out);
        Ok(())
    }

    pub fn smooth_selected(&mut self) -> Result<()> {
        let display = self.display_options()?;
        let index = self.selected_index()?;
        let out = self.records[index]
            .smooth(
                self.form.smoothing_length,
                self.form.window,
                &display,
                &mut self.figures,
            )
            .context("smoothing spectrum")?;
        self.push_record(out);
        Ok(())
    }

    pub fn lookup_line(&mut self) -> Result<()> {
        let display = self.display_options()?;
        let index = self.selected_index()?;
        let catalog = self.catalog.as_ref().context("No line catalog loaded")?;
        self.records[index]
            .lookup_line(&self.form.line_name, catalog, &display, &mut self.figures)
            .context("looking up line")?;
        Ok(())
    }

    /// Re-show the selected record as-is.
    pub fn replot_selected(&mut self) -> Result<()> {
        let display = self.display_options()?;
        let index = self.selected_index()?;
        crate::data::transform::show(&self.records[index], &display, &mut self.figures);
        Ok(())
    }

    pub fn remove_selected(&mut self) {
        let Some(index) = self.selected.filter(|&i| i < self.records.len()) else {
            return;
        };
        self.records.remove(index);
        self.form.subtract_target = match self.form.subtract_target {
            Some(t) if t == index => None,
            Some(t) if t > index => Some(t - 1),
            other => other,
        };
        self.selected = if self.records.is_empty() {
            None
        } else {
            Some(index.min(self.records.len() - 1))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::write_test_fits;
    use crate::data::model::Action;
    use std::io::Write;
    use tempfile::TempDir;

    fn state_with_spectrum(dir: &TempDir) -> AppState {
        let path = dir.path().join("spec.fits");
        write_test_fits(
            &path,
            3.5,
            0.0001,
            &[vec![1.0, 2.0, 3.0, 4.0], vec![0.5, 0.5, 0.5, 0.5]],
        )
        .unwrap();
        let mut state = AppState::default();
        state.open_spectrum(&path).unwrap();
        state
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("").unwrap(), None);
        assert_eq!(parse_range("4000, 7000").unwrap(), Some([4000.0, 7000.0]));
        assert_eq!(parse_range(" 1 2 ").unwrap(), Some([1.0, 2.0]));
        assert!(parse_range("1").is_err());
        assert!(parse_range("a, b").is_err());
    }

    #[test]
    fn test_parse_range_rejects_bad_bounds() {
        assert!(parse_range("7000, 4000").is_err());
        assert!(parse_range("5, 5").is_err());
        assert!(parse_range("NaN, 1").is_err());
        assert!(parse_range("0, inf").is_err());

        let mut state = AppState::default();
        state.form.xr = "7000, 4000".to_string();
        let err = state.display_options().unwrap_err();
        assert!(format!("{err:#}").contains("x range"));
    }

    #[test]
    fn test_form_overrides_merge_with_config() {
        let mut config = ViewerConfig::default();
        config.axes.ylabel = Some("Config flux".to_string());
        config.axes.xlabel = Some("Config wave".to_string());
        let mut state = AppState::new(config);
        state.form.xlabel = "Form wave".to_string();
        state.form.xr = "4000,5000".to_string();

        let display = state.display_options().unwrap();
        assert_eq!(display.axes.xlabel.as_deref(), Some("Form wave"));
        assert_eq!(display.axes.ylabel.as_deref(), Some("Config flux"));
        assert_eq!(display.axes.xr, Some([4000.0, 5000.0]));
    }

    #[test]
    fn test_open_spectrum_selects_it() {
        let dir = TempDir::new().unwrap();
        let state = state_with_spectrum(&dir);
        assert_eq!(state.records.len(), 1);
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.figures.figures.len(), 1);
        assert_eq!(state.selected_record().unwrap().action(), Action::Loaded);
    }

    #[test]
    fn test_open_second_row() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        state.form.row = 1;
        state.open_spectrum(&dir.path().join("spec.fits")).unwrap();
        assert_eq!(state.records[1].flux(), &[0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_open_row_past_sixty_four() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("many.fits");
        let rows: Vec<Vec<f64>> = (0..70).map(|r| vec![r as f64; 4]).collect();
        write_test_fits(&path, 3.5, 0.0001, &rows).unwrap();

        let mut state = AppState::default();
        state.form.row = 65;
        state.open_spectrum(&path).unwrap();
        assert_eq!(state.records[0].flux(), &[65.0; 4]);

        state.form.row = 70;
        let err = state.open_spectrum(&path).unwrap_err();
        assert!(format!("{err:#}").contains("70"));
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_open_rejects_non_fits() {
        let mut state = AppState::default();
        let err = state.open_spectrum(Path::new("notes.txt")).unwrap_err();
        assert!(format!("{err:#}").contains(".fits/.fits.gz"));
        assert!(state.records.is_empty());
    }

    #[test]
    fn test_subtract_and_smooth_append_records() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        state.form.row = 1;
        state.open_spectrum(&dir.path().join("spec.fits")).unwrap();

        state.select_record(0);
        state.form.subtract_target = Some(1);
        state.subtract_selected().unwrap();
        assert_eq!(state.records.len(), 3);
        assert_eq!(state.records[2].flux(), &[0.5, 1.5, 2.5, 3.5]);
        assert_eq!(state.records[2].action(), Action::Subtracted);
        assert_eq!(state.records[0].flux(), &[1.0, 2.0, 3.0, 4.0]);

        state.form.smoothing_length = 1;
        state.smooth_selected().unwrap();
        assert_eq!(state.records.len(), 4);
        assert_eq!(state.records[3].action(), Action::Smoothed);
        assert_eq!(state.selected, Some(3));
    }

    #[test]
    fn test_subtract_without_target_fails() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        let result = state.subtract_selected();
        assert!(result.is_err());
        state.report(result);
        assert!(state.status_message.unwrap().contains("No spectrum chosen"));
    }

    #[test]
    fn test_lookup_line_requires_catalog() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        state.form.line_name = "Test".to_string();
        assert!(state.lookup_line().is_err());

        let catalog_path = dir.path().join("lines.csv");
        let mut file = std::fs::File::create(&catalog_path).unwrap();
        writeln!(file, "name,wave_min,wave_max").unwrap();
        writeln!(file, "Test,3162.5,3163.5").unwrap();
        drop(file);

        state.open_catalog(&catalog_path).unwrap();
        let before = state.figures.figures.len();
        state.lookup_line().unwrap();
        assert_eq!(state.figures.figures.len(), before + 1);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_noplot_and_quiet_from_form() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        let (figures, messages) = (state.figures.figures.len(), state.figures.console.len());
        state.form.noplot = true;
        state.form.quiet = true;
        state.smooth_selected().unwrap();
        assert_eq!(state.figures.figures.len(), figures);
        assert_eq!(state.figures.console.len(), messages);
    }

    #[test]
    fn test_remove_selected_fixes_indices() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_spectrum(&dir);
        state.open_spectrum(&dir.path().join("spec.fits")).unwrap();
        state.open_spectrum(&dir.path().join("spec.fits")).unwrap();
        state.form.subtract_target = Some(2);

        state.select_record(1);
        state.remove_selected();
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.form.subtract_target, Some(1));
        assert_eq!(state.selected, Some(1));

        state.remove_selected();
        assert_eq!(state.form.subtract_target, None);
        assert_eq!(state.selected, Some(0));

        state.remove_selected();
        assert!(state.records.is_empty());
        assert_eq!(state.selected, None);
    }
}
