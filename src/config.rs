use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::figure::AxisOverrides;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "RUSTY_SPECTRA_CONFIG";
/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-spectra.json";

// ---------------------------------------------------------------------------
// Header key names
// ---------------------------------------------------------------------------

/// FITS header keywords the loader reads.  Defaults follow SDSS spSpec files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderKeys {
    pub name: String,
    pub ra: String,
    pub dec: String,
    /// Wavelength-unit description, e.g. `wtype=linear label=Wavelength units=Angstroms`.
    pub wave_unit: String,
    pub flux_unit: String,
    /// Log10 wavelength of pixel 0.
    pub coeff0: String,
    /// Log10 wavelength step per pixel.
    pub coeff1: String,
    pub naxis1: String,
}

impl Default for HeaderKeys {
    fn default() -> Self {
        Self {
            name: "NAME".to_string(),
            ra: "RA".to_string(),
            dec: "DEC".to_string(),
            wave_unit: "WAT1_001".to_string(),
            flux_unit: "BUNIT".to_string(),
            coeff0: "COEFF0".to_string(),
            coeff1: "COEFF1".to_string(),
            naxis1: "NAXIS1".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Display padding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Relative padding on both ends of the wavelength display range.
    pub wave_padding: f64,
    /// Relative padding on the upper end of the flux display range.
    pub flux_padding: f64,
    /// Relative padding around a catalog line's bounds for line lookups.
    pub line_padding: f64,
    /// Clamp the flux axis to the derived flux range when plotting.
    pub fit_flux_range: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            wave_padding: 0.05,
            flux_padding: 0.10,
            line_padding: 2.0,
            fit_flux_range: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Form defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadDefaults {
    pub extension: usize,
    pub row: usize,
    pub smoothing_length: usize,
    pub window: String,
}

impl Default for LoadDefaults {
    fn default() -> Self {
        Self {
            extension: 0,
            row: 0,
            smoothing_length: 5,
            window: "boxcar".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ViewerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub keys: HeaderKeys,
    pub display: DisplayConfig,
    pub defaults: LoadDefaults,
    /// Line catalog opened at start-up.
    pub line_catalog: Option<PathBuf>,
    /// Axis overrides applied to every figure unless a call overrides them.
    pub axes: AxisOverrides,
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `$RUSTY_SPECTRA_CONFIG`, then `./rusty-spectra.json`, then defaults.
    pub fn resolve() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            let path = PathBuf::from(path);
            log::debug!("Using config from ${CONFIG_ENV}: {}", path.display());
            return Self::from_file(&path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            log::debug!("Using config {}", local.display());
            return Self::from_file(local);
        }
        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.keys.coeff0, "COEFF0");
        assert_eq!(config.keys.wave_unit, "WAT1_001");
        assert_eq!(config.display.wave_padding, 0.05);
        assert_eq!(config.display.flux_padding, 0.10);
        assert!(!config.display.fit_flux_range);
        assert_eq!(config.defaults.window, "boxcar");
        assert!(config.line_catalog.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "keys": { "name": "OBJECT" },
            "display": { "fit_flux_range": true },
            "axes": { "xlabel": "Lambda", "xr": [4000.0, 7000.0] }
        }"#;
        let config: ViewerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.keys.name, "OBJECT");
        assert_eq!(config.keys.flux_unit, "BUNIT");
        assert!(config.display.fit_flux_range);
        assert_eq!(config.display.line_padding, 2.0);
        assert_eq!(config.axes.xlabel.as_deref(), Some("Lambda"));
        assert_eq!(config.axes.xr, Some([4000.0, 7000.0]));
        assert_eq!(config.defaults.smoothing_length, 5);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "defaults": {{ "row": 2, "window": "hann" }} }}"#).unwrap();
        let config = ViewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.defaults.row, 2);
        assert_eq!(config.defaults.window, "hann");
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ViewerConfig::from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
