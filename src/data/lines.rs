use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Result, SpectrumError};
use super::range::{embiggen, PadMode};

// ---------------------------------------------------------------------------
// SpectralLine – one catalog row
// ---------------------------------------------------------------------------

/// CSV layout: header row `name,wave_min,wave_max[,wave_center][,species]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralLine {
    pub name: String,
    pub wave_min: f64,
    pub wave_max: f64,
    #[serde(default)]
    pub wave_center: Option<f64>,
    #[serde(default)]
    pub species: Option<String>,
}

impl SpectralLine {
    /// Explicit centre, or the midpoint of the bounds.
    pub fn center(&self) -> f64 {
        self.wave_center
            .unwrap_or(0.5 * (self.wave_min + self.wave_max))
    }

    /// Display window around the line bounds.
    pub fn window(&self, padding: f64) -> [f64; 2] {
        embiggen([self.wave_min, self.wave_max], padding, PadMode::Both)
    }
}

impl fmt::Display for SpectralLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | [{:.2}, {:.2}] | center {:.2}",
            self.name,
            self.wave_min,
            self.wave_max,
            self.center()
        )?;
        if let Some(species) = &self.species {
            write!(f, " | {species}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LineCatalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LineCatalog {
    pub lines: Vec<SpectralLine>,
}

impl LineCatalog {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        log::info!("Loaded {} catalog lines from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut lines = Vec::new();
        for (row_no, result) in csv_reader.deserialize().enumerate() {
            let line: SpectralLine = result?;
            if line.wave_min > line.wave_max {
                return Err(SpectrumError::Catalog(format!(
                    "row {row_no} ({}): wave_min {} > wave_max {}",
                    line.name, line.wave_min, line.wave_max
                )));
            }
            lines.push(line);
        }
        Ok(Self { lines })
    }

    /// Case-insensitive lookup by line name.
    pub fn find(&self, name: &str) -> Result<&SpectralLine> {
        let wanted = name.trim();
        self.lines
            .iter()
            .find(|line| line.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SpectrumError::LineNotFound(wanted.to_string()))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
