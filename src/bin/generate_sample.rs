use anyhow::{Context, Result};
use fitsio::images::{ImageDescription, ImageType};
use fitsio::FitsFile;
use serde::Serialize;

/// log10 of the first pixel's wavelength (Angstroms), SDSS-style.
const COEFF0: f64 = 3.5780;
/// log10 wavelength step per pixel.
const COEFF1: f64 = 0.0001;
const NPIX: usize = 3800;

const SPECTRUM_PATH: &str = "sample_spectrum.fits";
const CATALOG_PATH: &str = "sample_lines.csv";

/// (name, rest wavelength, sigma, amplitude); negative amplitude = absorption.
const LINES: [(&str, f64, f64, f64); 7] = [
    ("Hbeta", 4861.3, 3.0, 12.0),
    ("OIII_4959", 4958.9, 2.5, 8.0),
    ("OIII_5007", 5006.8, 2.5, 24.0),
    ("NaD", 5892.9, 4.0, -3.0),
    ("NII_6548", 6548.0, 2.5, 6.0),
    ("Halpha", 6562.8, 3.0, 40.0),
    ("NII_6583", 6583.5, 2.5, 14.0),
];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Smooth blue-declining continuum.
fn continuum(wave: f64) -> f64 {
    8.0 * (wave / 5000.0).powf(-1.5) + 2.0
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Serialize)]
struct CatalogRow<'a> {
    name: &'a str,
    wave_min: f64,
    wave_max: f64,
    wave_center: f64,
    species: &'a str,
}

fn species(name: &str) -> &'static str {
    match name.split('_').next().unwrap_or(name) {
        "Hbeta" | "Halpha" => "H I",
        "OIII" => "[O III]",
        "NII" => "[N II]",
        "NaD" => "Na I",
        _ => "",
    }
}

fn write_spectrum(rng: &mut SimpleRng) -> Result<()> {
    let wave: Vec<f64> = (0..NPIX)
        .map(|i| 10f64.powf(COEFF0 + COEFF1 * i as f64))
        .collect();

    let cont: Vec<f64> = wave.iter().map(|&w| continuum(w)).collect();
    let flux: Vec<f64> = wave
        .iter()
        .zip(&cont)
        .map(|(&w, &c)| {
            let lines: f64 = LINES
                .iter()
                .map(|&(_, mu, sigma, amp)| gaussian(w, mu, sigma, amp))
                .sum();
            c + lines + rng.gauss(0.0, 0.4)
        })
        .collect();

    // Row 0: observed flux, row 1: continuum model.
    let payload: Vec<f64> = flux.iter().chain(cont.iter()).copied().collect();

    let description = ImageDescription {
        data_type: ImageType::Double,
        dimensions: &[2, NPIX],
    };
    let mut fptr = FitsFile::create(SPECTRUM_PATH)
        .with_custom_primary(&description)
        .overwrite()
        .open()
        .context("creating FITS file")?;
    let hdu = fptr.primary_hdu().context("opening primary HDU")?;
    hdu.write_image(&mut fptr, &payload)
        .context("writing spectrum rows")?;

    hdu.write_key(&mut fptr, "NAME", "SAMPLE J1234+0012")?;
    hdu.write_key(&mut fptr, "RA", 188.5625)?;
    hdu.write_key(&mut fptr, "DEC", 0.2041)?;
    hdu.write_key(
        &mut fptr,
        "WAT1_001",
        "wtype=linear label=Wavelength units=Angstroms",
    )?;
    hdu.write_key(&mut fptr, "BUNIT", "1E-17 erg/cm/s^2/Ang")?;
    hdu.write_key(&mut fptr, "COEFF0", COEFF0)?;
    hdu.write_key(&mut fptr, "COEFF1", COEFF1)?;
    Ok(())
}

fn write_catalog() -> Result<()> {
    let mut writer = csv::Writer::from_path(CATALOG_PATH).context("creating catalog")?;
    for &(name, mu, sigma, _) in &LINES {
        writer.serialize(CatalogRow {
            name,
            wave_min: mu - 3.0 * sigma,
            wave_max: mu + 3.0 * sigma,
            wave_center: mu,
            species: species(name),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    write_spectrum(&mut rng)?;
    write_catalog()?;

    println!(
        "Wrote {NPIX}-pixel spectrum to {SPECTRUM_PATH} and {} lines to {CATALOG_PATH}",
        LINES.len()
    );
    Ok(())
}
