use super::error::{Result, SpectrumError};
use super::lines::{LineCatalog, SpectralLine};
use super::model::{Action, SpectralRecord};
use super::smooth::{smooth, WindowShape};
use crate::figure::{AxisOverrides, Marker, PlotSurface};

// ---------------------------------------------------------------------------
// Display options
// ---------------------------------------------------------------------------

/// Per-call display control for loading and transformations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayOptions {
    /// Skip the figure.
    pub noplot: bool,
    /// Skip the informational summary.
    pub quiet: bool,
    pub axes: AxisOverrides,
}

// ---------------------------------------------------------------------------
// Protocol: duplicate → core → show
// ---------------------------------------------------------------------------

/// Copy-before-mutate: the caller's record is never touched.
pub fn duplicate(record: &SpectralRecord) -> SpectralRecord {
    record.clone()
}

/// Display-after-mutate: summary unless `quiet`, figure unless `noplot`.
pub fn show(record: &SpectralRecord, options: &DisplayOptions, surface: &mut dyn PlotSurface) {
    if !options.quiet {
        surface.info(&record.summary());
    }
    if !options.noplot {
        surface.figure(record.figure(&options.axes));
    }
}

/// Run `core` on a copy of `record`, tag it with `action`, then show it.
///
/// If `core` fails nothing is shown and the error is returned.
pub fn apply<F>(
    record: &SpectralRecord,
    action: Action,
    options: &DisplayOptions,
    surface: &mut dyn PlotSurface,
    core: F,
) -> Result<SpectralRecord>
where
    F: FnOnce(&mut SpectralRecord) -> Result<()>,
{
    let mut out = duplicate(record);
    core(&mut out)?;
    out.set_action(action);
    log::debug!("{action}: {}", out.name());
    show(&out, options, surface);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl SpectralRecord {
    /// `self.flux - other.flux`, element-wise.
    pub fn subtract(
        &self,
        other: &SpectralRecord,
        options: &DisplayOptions,
        surface: &mut dyn PlotSurface,
    ) -> Result<SpectralRecord> {
        if self.flux().len() != other.flux().len() {
            return Err(SpectrumError::LengthMismatch {
                left: self.flux().len(),
                right: other.flux().len(),
            });
        }
        apply(self, Action::Subtracted, options, surface, |out| {
            let diff = out
                .flux()
                .iter()
                .zip(other.flux())
                .map(|(a, b)| a - b)
                .collect();
            out.set_flux(diff)
        })
    }

    /// Convolve flux with a normalized `shape` window of length `len`.
    pub fn smooth(
        &self,
        len: usize,
        shape: WindowShape,
        options: &DisplayOptions,
        surface: &mut dyn PlotSurface,
    ) -> Result<SpectralRecord> {
        apply(self, Action::Smoothed, options, surface, |out| {
            let smoothed = smooth(out.flux(), len, shape)?;
            out.set_flux(smoothed)
        })
    }

    /// Find `name` in `catalog`, print the row, and plot the record zoomed to
    /// the line. Leaves the record untouched.
    pub fn lookup_line<'c>(
        &self,
        name: &str,
        catalog: &'c LineCatalog,
        options: &DisplayOptions,
        surface: &mut dyn PlotSurface,
    ) -> Result<&'c SpectralLine> {
        let line = catalog.find(name)?;
        let window = line.window(self.display_config().line_padding);
        log::info!("{}: line {} window {window:?}", self.name(), line.name);

        if !options.quiet {
            surface.info(&line.to_string());
        }
        if !options.noplot {
            let mut figure = self.figure(&options.axes);
            if options.axes.title.is_none() {
                figure.title = format!("{}: {}", line.name, self.name());
            }
            figure.x_range = Some(window);
            figure.markers = [
                (line.wave_min, format!("{} min", line.name)),
                (line.center(), line.name.clone()),
                (line.wave_max, format!("{} max", line.name)),
            ]
            .into_iter()
            .map(|(x, label)| Marker { x, label })
            .collect();
            surface.figure(figure);
        }
        Ok(line)
    }
}
