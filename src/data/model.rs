use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::derived::DerivedCache;
use super::error::{Result, SpectrumError};
use super::range::{embiggen, finite_extent, PadMode};
use crate::config::DisplayConfig;
use crate::figure::{AxisOverrides, Figure, Series};

// ---------------------------------------------------------------------------
// Action – most recent lifecycle transition (display only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Initialized,
    Loaded,
    Subtracted,
    Smoothed,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Initialized => "Initialized",
            Action::Loaded => "Loaded",
            Action::Subtracted => "Subtracted",
            Action::Smoothed => "Smoothed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Extension – which HDU the data plane came from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    Index(usize),
    /// Matched against `EXTNAME`.
    Name(String),
}

impl Default for Extension {
    fn default() -> Self {
        Extension::Index(0)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extension::Index(i) => write!(f, "{i}"),
            Extension::Name(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Extension {
    /// Digits select by index, anything else by name; empty is the primary HDU.
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Extension::default();
        }
        match s.parse::<usize>() {
            Ok(i) => Extension::Index(i),
            Err(_) => Extension::Name(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// SpectrumHeader – the header values a record depends on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumHeader {
    pub name: Option<String>,
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub wave_unit_desc: String,
    pub flux_unit: String,
    pub coeff0: f64,
    pub coeff1: f64,
    pub naxis1: usize,
}

/// Log-linear dispersion solution: `10^(c0 + c1*i)` for `i in 0..n`.
pub fn log_linear_wavelengths(coeff0: f64, coeff1: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10f64.powf(coeff0 + coeff1 * i as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// SpectralRecord – one loaded spectrum
// ---------------------------------------------------------------------------

/// One spectrum: wavelength/flux arrays plus identity and display metadata.
///
/// `flux` is only writable through [`SpectralRecord::set_flux`], which
/// enforces the length invariant and drops cached display ranges. `raw` is
/// shared between copies and never changes.
#[derive(Debug, Clone)]
pub struct SpectralRecord {
    path: PathBuf,
    file_name: String,
    name: String,
    extension: Extension,
    row: usize,
    header: SpectrumHeader,
    wave: Vec<f64>,
    flux: Vec<f64>,
    raw: Arc<[f64]>,
    action: Action,
    display: DisplayConfig,
    derived: DerivedCache,
}

impl SpectralRecord {
    /// Assemble a record from an already-read header and flux row.
    pub fn new(
        path: &Path,
        extension: Extension,
        row: usize,
        header: SpectrumHeader,
        flux: Vec<f64>,
        display: DisplayConfig,
    ) -> Result<Self> {
        if header.naxis1 == 0 {
            return Err(SpectrumError::EmptySpectrum(0));
        }
        if flux.len() != header.naxis1 {
            return Err(SpectrumError::Shape(format!(
                "flux row has {} values but axis length is {}",
                flux.len(),
                header.naxis1
            )));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let name = match &header.name {
            Some(name) => name.clone(),
            None => {
                log::warn!("{file_name}: no name in header, using file name");
                file_name.clone()
            }
        };
        let wave = log_linear_wavelengths(header.coeff0, header.coeff1, header.naxis1);
        let raw: Arc<[f64]> = Arc::from(flux.as_slice());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            name,
            extension,
            row,
            header,
            wave,
            flux,
            raw,
            action: Action::Initialized,
            display,
            derived: DerivedCache::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn header(&self) -> &SpectrumHeader {
        &self.header
    }

    #[cfg(test)]
    pub fn wave(&self) -> &[f64] {
        &self.wave
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    /// Flux exactly as loaded, before any transformation.
    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    pub fn display_config(&self) -> DisplayConfig {
        self.display
    }

    pub fn len(&self) -> usize {
        self.wave.len()
    }

    /// Replace the flux, keeping `wave` and `flux` the same length.
    pub fn set_flux(&mut self, flux: Vec<f64>) -> Result<()> {
        if flux.len() != self.wave.len() {
            return Err(SpectrumError::LengthMismatch {
                left: self.wave.len(),
                right: flux.len(),
            });
        }
        self.flux = flux;
        self.derived.invalidate();
        Ok(())
    }

    // -- Derived display metadata --

    /// Trailing `=` token of the wavelength-unit description.
    pub fn wave_unit(&self) -> &str {
        self.derived.wave_unit(|| {
            let desc = &self.header.wave_unit_desc;
            desc.rsplit('=').next().unwrap_or(desc).trim().to_string()
        })
    }

    pub fn flux_unit(&self) -> &str {
        self.derived
            .flux_unit(|| self.header.flux_unit.trim().to_string())
    }

    /// Wavelength extent where flux is positive, padded on both sides.
    pub fn wave_range(&self) -> [f64; 2] {
        self.derived.wave_range(|| {
            let positive = self
                .wave
                .iter()
                .zip(&self.flux)
                .filter(|&(_, &f)| f > 0.0)
                .map(|(&w, _)| w);
            let mut extent = finite_extent(positive).unwrap_or_else(|| {
                log::warn!("{}: no positive flux, using full wavelength extent", self.name);
                finite_extent(self.wave.iter().copied()).unwrap_or([0.0, 0.0])
            });
            if extent[0] == extent[1] {
                // One pixel in a log-linear grid: neighbours sit at w / 10^c1 and w * 10^c1.
                let step = 10f64.powf(self.header.coeff1.abs());
                extent = [extent[0] / step, extent[1] * step];
            }
            log::debug!("{}: wavelength extent {extent:?}", self.name);
            embiggen(extent, self.display.wave_padding, PadMode::Both)
        })
    }

    /// `[0, max flux]`, padded on the upper bound.
    pub fn flux_range(&self) -> [f64; 2] {
        self.derived.flux_range(|| {
            let max = finite_extent(self.flux.iter().copied())
                .map(|[_, hi]| hi)
                .unwrap_or(0.0);
            // An all-negative spectrum still gets an ascending range.
            let range = [max.min(0.0), max.max(0.0)];
            embiggen(range, self.display.flux_padding, PadMode::Upper)
        })
    }

    /// Multi-line informational summary.
    pub fn summary(&self) -> String {
        let [wmin, wmax] = finite_extent(self.wave.iter().copied()).unwrap_or([0.0, 0.0]);
        let mut out = format!("{}: {} [{}]", self.action, self.name, self.file_name);
        if let (Some(ra), Some(dec)) = (&self.header.ra, &self.header.dec) {
            out.push_str(&format!("\n | RA/DEC: {ra}, {dec}"));
        }
        out.push_str(&format!(
            "\n | Wavelength Coverage: [{wmin:.2}, {wmax:.2}] {}",
            self.wave_unit()
        ));
        out.push_str(&format!("\n | Flux Units: {}", self.flux_unit()));
        out
    }

    /// Build the figure for this record with derived axes and `overrides` on top.
    pub fn figure(&self, overrides: &AxisOverrides) -> Figure {
        let mut figure = Figure::new(format!("{}: {}", self.action, self.name));
        figure.x_label = format!("Wavelength [{}]", self.wave_unit());
        figure.y_label = format!("Flux [{}]", self.flux_unit());
        figure.x_range = Some(self.wave_range());
        if self.display.fit_flux_range {
            figure.y_range = Some(self.flux_range());
        }
        figure.series.push(Series {
            name: self.name.clone(),
            action: self.action,
            points: self
                .wave
                .iter()
                .zip(&self.flux)
                .map(|(&w, &f)| [w, f])
                .collect(),
        });
        if overrides.raw {
            figure.series.push(Series {
                name: format!("{} (raw)", self.name),
                action: Action::Loaded,
                points: self
                    .wave
                    .iter()
                    .zip(self.raw.iter())
                    .map(|(&w, &f)| [w, f])
                    .collect(),
            });
        }
        overrides.apply(&mut figure);
        figure
    }
}

impl fmt::Display for SpectralRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spectra Object for {}", self.name)
    }
}

/// Record with an SDSS-like header for unit tests.
#[cfg(test)]
pub(crate) fn test_record(coeff0: f64, coeff1: f64, flux: Vec<f64>) -> SpectralRecord {
    let header = SpectrumHeader {
        name: Some("SDSS J0001".to_string()),
        ra: Some("150.1".to_string()),
        dec: Some("2.2".to_string()),
        wave_unit_desc: "wtype=linear label=Wavelength units=Angstroms".to_string(),
        flux_unit: "1E-17 erg/cm/s^2/Ang".to_string(),
        coeff0,
        coeff1,
        naxis1: flux.len(),
    };
    SpectralRecord::new(
        Path::new("/data/spSpec-51636-0282-001.fits"),
        Extension::Index(0),
        0,
        header,
        flux,
        DisplayConfig::default(),
    )
    .unwrap()
}
