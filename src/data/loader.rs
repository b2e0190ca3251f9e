use std::path::Path;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use ndarray::Array2;

use super::error::{Result, SpectrumError};
use super::model::{Action, Extension, SpectralRecord, SpectrumHeader};
use super::transform::{show, DisplayOptions};
use crate::config::{DisplayConfig, HeaderKeys, ViewerConfig};
use crate::figure::PlotSurface;

/// File name suffixes accepted as FITS (optionally followed by `.gz`).
const FITS_SUFFIXES: [&str; 3] = ["fits", "fit", "fts"];

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub extension: Extension,
    /// Payload row used as flux.
    pub row: usize,
    pub keys: HeaderKeys,
    pub display: DisplayConfig,
}

impl LoadOptions {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            extension: Extension::Index(config.defaults.extension),
            row: config.defaults.row,
            keys: config.keys.clone(),
            display: config.display,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Whether `path` names a FITS file (`.fits`, `.fit`, `.fts`, plain or gzipped).
pub fn is_fits_path(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    FITS_SUFFIXES
        .iter()
        .any(|suffix| name.len() > suffix.len() + 1 && name.ends_with(&format!(".{suffix}")))
}

/// Load a spectrum and show it (summary + figure) unless suppressed.
pub fn load_spectrum(
    path: &Path,
    options: &LoadOptions,
    display: &DisplayOptions,
    surface: &mut dyn PlotSurface,
) -> Result<SpectralRecord> {
    let mut record = read_spectrum(path, options)?;
    record.set_action(Action::Loaded);
    log::info!(
        "Loaded {} ({} pixels) from {} [ext {}, row {}]",
        record.name(),
        record.len(),
        path.display(),
        options.extension,
        options.row
    );
    show(&record, display, surface);
    Ok(record)
}

/// Read header and flux row without any display side effects.
pub fn read_spectrum(path: &Path, options: &LoadOptions) -> Result<SpectralRecord> {
    if !is_fits_path(path) {
        return Err(SpectrumError::UnsupportedExtension(path.to_path_buf()));
    }

    let mut fptr = FitsFile::open(path)?;
    let hdu = match &options.extension {
        Extension::Index(i) => fptr.hdu(*i)?,
        Extension::Name(name) => fptr.hdu(name.as_str())?,
    };
    if !matches!(hdu.info, HduInfo::ImageInfo { .. }) {
        return Err(SpectrumError::Shape(format!(
            "extension {} is not an image",
            options.extension
        )));
    }

    let header = read_header(&mut fptr, &hdu, &options.keys)?;
    let payload: Vec<f64> = hdu.read_image(&mut fptr)?;
    let rows = payload_rows(payload, header.naxis1)?;
    if options.row >= rows.nrows() {
        return Err(SpectrumError::RowOutOfRange {
            row: options.row,
            rows: rows.nrows(),
        });
    }
    let flux = rows.row(options.row).to_vec();

    SpectralRecord::new(
        path,
        options.extension.clone(),
        options.row,
        header,
        flux,
        options.display,
    )
}

// ---------------------------------------------------------------------------
// Header / payload helpers
// ---------------------------------------------------------------------------

fn read_header(fptr: &mut FitsFile, hdu: &FitsHdu, keys: &HeaderKeys) -> Result<SpectrumHeader> {
    let naxis1 = required::<i64>(fptr, hdu, &keys.naxis1)?;
    if naxis1 <= 0 {
        return Err(SpectrumError::EmptySpectrum(naxis1));
    }

    Ok(SpectrumHeader {
        name: hdu.read_key::<String>(fptr, &keys.name).ok(),
        ra: optional_text(fptr, hdu, &keys.ra),
        dec: optional_text(fptr, hdu, &keys.dec),
        wave_unit_desc: required::<String>(fptr, hdu, &keys.wave_unit)?,
        flux_unit: required::<String>(fptr, hdu, &keys.flux_unit)?,
        coeff0: required::<f64>(fptr, hdu, &keys.coeff0)?,
        coeff1: required::<f64>(fptr, hdu, &keys.coeff1)?,
        naxis1: naxis1 as usize,
    })
}

fn required<T: fitsio::headers::ReadsKey>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    key: &str,
) -> Result<T> {
    hdu.read_key::<T>(fptr, key)
        .map_err(|e| SpectrumError::MissingKey {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Numeric or string keyword rendered as text; `None` when absent.
fn optional_text(fptr: &mut FitsFile, hdu: &FitsHdu, key: &str) -> Option<String> {
    hdu.read_key::<f64>(fptr, key)
        .map(|v| v.to_string())
        .or_else(|_| hdu.read_key::<String>(fptr, key))
        .ok()
}

/// Reshape a flat image payload into `rows × naxis1`.
fn payload_rows(payload: Vec<f64>, naxis1: usize) -> Result<Array2<f64>> {
    if payload.is_empty() || payload.len() % naxis1 != 0 {
        return Err(SpectrumError::Shape(format!(
            "{} values cannot be split into rows of {naxis1}",
            payload.len()
        )));
    }
    let rows = payload.len() / naxis1;
    Array2::from_shape_vec((rows, naxis1), payload)
        .map_err(|e| SpectrumError::Shape(format!("cannot reshape payload: {e}")))
}

/// Write a primary-HDU spectrum with an SDSS-style header.
#[cfg(test)]
pub(crate) fn write_test_fits(
    path: &Path,
    coeff0: f64,
    coeff1: f64,
    rows: &[Vec<f64>],
) -> fitsio::errors::Result<()> {
    use fitsio::images::{ImageDescription, ImageType};

    let n = rows[0].len();
    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[rows.len(), n],
    };
    let mut fptr = FitsFile::create(path)
        .with_custom_primary(&description)
        .overwrite()
        .open()?;
    let hdu = fptr.primary_hdu()?;
    hdu.write_image(&mut fptr, &rows.concat())?;
    hdu.write_key(&mut fptr, "NAME", "SDSS J0001")?;
    hdu.write_key(&mut fptr, "RA", 150.125)?;
    hdu.write_key(&mut fptr, "DEC", 2.25)?;
    hdu.write_key(
        &mut fptr,
        "WAT1_001",
        "wtype=linear label=Wavelength units=Angstroms",
    )?;
    hdu.write_key(&mut fptr, "BUNIT", "1E-17 erg/cm/s^2/Ang")?;
    hdu.write_key(&mut fptr, "COEFF0", coeff0)?;
    hdu.write_key(&mut fptr, "COEFF1", coeff1)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::FigureBook;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn sample_rows() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0, 4.0, 2.0, 0.5],
            vec![10.0, 11.0, 12.0, 13.0, 14.0],
        ]
    }

    #[test]
    fn test_is_fits_path() {
        assert!(is_fits_path(Path::new("spSpec-51636-0282-001.fits")));
        assert!(is_fits_path(Path::new("/data/a.FITS.gz")));
        assert!(is_fits_path(Path::new("a.fit")));
        assert!(is_fits_path(Path::new("a.fts.gz")));
        assert!(!is_fits_path(Path::new("a.csv")));
        assert!(!is_fits_path(Path::new("fits")));
        assert!(!is_fits_path(Path::new(".fits")));
        assert!(!is_fits_path(Path::new("a.fits.txt")));
        assert!(!is_fits_path(Path::new("a.gz")));
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = read_spectrum(Path::new("spectrum.txt"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SpectrumError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_load_matches_axis_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.fits");
        write_test_fits(&path, 3.5, 0.0001, &sample_rows()).unwrap();

        let record = read_spectrum(&path, &LoadOptions::default()).unwrap();
        assert_eq!(record.wave().len(), 5);
        assert_eq!(record.flux().len(), 5);
        assert_eq!(record.header().naxis1, 5);
        assert_eq!(record.flux(), &[0.0, 1.0, 4.0, 2.0, 0.5]);
        assert_eq!(record.raw(), record.flux());
        assert_eq!(record.name(), "SDSS J0001");
        assert_eq!(record.file_name(), "spec.fits");
        assert_eq!(record.wave_unit(), "Angstroms");
        assert_eq!(record.flux_unit(), "1E-17 erg/cm/s^2/Ang");
        assert_relative_eq!(record.wave()[0], 3162.2777, epsilon = 1e-3);
        assert_relative_eq!(record.wave()[1], 3163.0059, epsilon = 1e-3);
        assert_relative_eq!(record.wave()[2], 3163.7342, epsilon = 1e-3);
        assert!(record.header().ra.is_some());
        assert!(record.header().dec.is_some());
    }

    #[test]
    fn test_load_gzipped_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("spec.fits");
        write_test_fits(&plain, 3.5, 0.0001, &sample_rows()).unwrap();

        let gz_path = dir.path().join("spec.fits.gz");
        let mut encoder = GzEncoder::new(
            std::fs::File::create(&gz_path).unwrap(),
            Compression::default(),
        );
        std::io::copy(&mut std::fs::File::open(&plain).unwrap(), &mut encoder).unwrap();
        encoder.finish().unwrap();
        std::fs::remove_file(&plain).unwrap();

        let options = LoadOptions {
            row: 1,
            ..Default::default()
        };
        let record = read_spectrum(&gz_path, &options).unwrap();
        assert_eq!(record.file_name(), "spec.fits.gz");
        assert_eq!(record.name(), "SDSS J0001");
        assert_eq!(record.flux(), &[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(record.wave_unit(), "Angstroms");
    }

    #[test]
    fn test_row_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.fits");
        write_test_fits(&path, 3.5, 0.0001, &sample_rows()).unwrap();

        let options = LoadOptions {
            row: 1,
            ..Default::default()
        };
        let record = read_spectrum(&path, &options).unwrap();
        assert_eq!(record.flux(), &[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(record.row(), 1);

        let options = LoadOptions {
            row: 2,
            ..Default::default()
        };
        let err = read_spectrum(&path, &options).unwrap_err();
        assert!(matches!(err, SpectrumError::RowOutOfRange { row: 2, rows: 2 }));
    }

    #[test]
    fn test_missing_required_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.fits");
        write_test_fits(&path, 3.5, 0.0001, &sample_rows()).unwrap();

        let mut options = LoadOptions::default();
        options.keys.coeff1 = "CD1_1".to_string();
        let err = read_spectrum(&path, &options).unwrap_err();
        match err {
            SpectrumError::MissingKey { key, .. } => assert_eq!(key, "CD1_1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_two_loads_share_raw_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.fits");
        write_test_fits(&path, 3.5, 0.0001, &sample_rows()).unwrap();

        let first = read_spectrum(&path, &LoadOptions::default()).unwrap();
        let mut second = read_spectrum(&path, &LoadOptions::default()).unwrap();
        assert_eq!(first.raw(), second.raw());

        second.set_flux(vec![9.0; 5]).unwrap();
        assert_eq!(first.raw(), second.raw());
        assert_eq!(second.raw(), &[0.0, 1.0, 4.0, 2.0, 0.5]);
        assert_eq!(first.flux(), &[0.0, 1.0, 4.0, 2.0, 0.5]);
    }

    #[test]
    fn test_load_spectrum_shows_unless_suppressed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spec.fits");
        write_test_fits(&path, 3.5, 0.0001, &sample_rows()).unwrap();

        let mut book = FigureBook::default();
        let record =
            load_spectrum(&path, &LoadOptions::default(), &DisplayOptions::default(), &mut book)
                .unwrap();
        assert_eq!(record.action(), Action::Loaded);
        assert_eq!(book.figures.len(), 1);
        assert_eq!(book.console.len(), 1);
        assert!(book.console[0].starts_with("Loaded: SDSS J0001 [spec.fits]"));

        let quiet = DisplayOptions {
            noplot: true,
            quiet: true,
            ..Default::default()
        };
        load_spectrum(&path, &LoadOptions::default(), &quiet, &mut book).unwrap();
        assert_eq!(book.figures.len(), 1);
        assert_eq!(book.console.len(), 1);
    }
}
