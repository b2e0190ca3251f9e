use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use super::error::{Result, SpectrumError};

// ---------------------------------------------------------------------------
// WindowShape – classical smoothing kernels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowShape {
    #[default]
    Boxcar,
    Triang,
    Blackman,
    Hamming,
    Hann,
    Bartlett,
    Flattop,
    Parzen,
    Bohman,
    BlackmanHarris,
    Nuttall,
    Barthann,
}

impl WindowShape {
    pub const ALL: [WindowShape; 12] = [
        WindowShape::Boxcar,
        WindowShape::Triang,
        WindowShape::Blackman,
        WindowShape::Hamming,
        WindowShape::Hann,
        WindowShape::Bartlett,
        WindowShape::Flattop,
        WindowShape::Parzen,
        WindowShape::Bohman,
        WindowShape::BlackmanHarris,
        WindowShape::Nuttall,
        WindowShape::Barthann,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WindowShape::Boxcar => "boxcar",
            WindowShape::Triang => "triang",
            WindowShape::Blackman => "blackman",
            WindowShape::Hamming => "hamming",
            WindowShape::Hann => "hann",
            WindowShape::Bartlett => "bartlett",
            WindowShape::Flattop => "flattop",
            WindowShape::Parzen => "parzen",
            WindowShape::Bohman => "bohman",
            WindowShape::BlackmanHarris => "blackmanharris",
            WindowShape::Nuttall => "nuttall",
            WindowShape::Barthann => "barthann",
        }
    }

    /// Symmetric window of length `m` (first and last samples mirror).
    fn symmetric(&self, m: usize) -> Vec<f64> {
        if m <= 1 {
            return vec![1.0; m];
        }
        let mf = m as f64;
        match self {
            WindowShape::Boxcar => vec![1.0; m],
            WindowShape::Triang => {
                let half = (m + 1) / 2;
                let rising: Vec<f64> = (1..=half)
                    .map(|n| {
                        let n = n as f64;
                        if m % 2 == 0 {
                            (2.0 * n - 1.0) / mf
                        } else {
                            2.0 * n / (mf + 1.0)
                        }
                    })
                    .collect();
                let mut w = rising.clone();
                let skip = if m % 2 == 0 { 0 } else { 1 };
                w.extend(rising.iter().rev().skip(skip));
                w
            }
            WindowShape::Bartlett => (0..m)
                .map(|n| {
                    let n = n as f64;
                    let x = 2.0 * n / (mf - 1.0);
                    if n <= (mf - 1.0) / 2.0 {
                        x
                    } else {
                        2.0 - x
                    }
                })
                .collect(),
            WindowShape::Hann => general_cosine(m, &[0.5, 0.5]),
            WindowShape::Hamming => general_cosine(m, &[0.54, 0.46]),
            WindowShape::Blackman => general_cosine(m, &[0.42, 0.50, 0.08]),
            WindowShape::BlackmanHarris => {
                general_cosine(m, &[0.35875, 0.48829, 0.14128, 0.01168])
            }
            WindowShape::Nuttall => {
                general_cosine(m, &[0.3635819, 0.4891775, 0.1365995, 0.0106411])
            }
            WindowShape::Flattop => general_cosine(
                m,
                &[
                    0.21557895,
                    0.41663158,
                    0.277263158,
                    0.083578947,
                    0.006947368,
                ],
            ),
            WindowShape::Parzen => {
                let half = mf / 2.0;
                let quarter = (mf - 1.0) / 4.0;
                (0..m)
                    .map(|i| {
                        let n = (i as f64 - (mf - 1.0) / 2.0).abs();
                        let r = n / half;
                        if n <= quarter {
                            1.0 - 6.0 * r.powi(2) + 6.0 * r.powi(3)
                        } else {
                            2.0 * (1.0 - r).powi(3)
                        }
                    })
                    .collect()
            }
            WindowShape::Bohman => (0..m)
                .map(|i| {
                    if i == 0 || i == m - 1 {
                        return 0.0;
                    }
                    let fac = (-1.0 + 2.0 * i as f64 / (mf - 1.0)).abs();
                    (1.0 - fac) * (PI * fac).cos() + (PI * fac).sin() / PI
                })
                .collect(),
            WindowShape::Barthann => (0..m)
                .map(|i| {
                    let fac = (i as f64 / (mf - 1.0) - 0.5).abs();
                    0.62 - 0.48 * fac + 0.38 * (2.0 * PI * fac).cos()
                })
                .collect(),
        }
    }

    /// Periodic window of length `len`, the form `scipy.signal.get_window`
    /// returns by default.
    pub fn periodic(&self, len: usize) -> Vec<f64> {
        if len <= 1 {
            return vec![1.0; len];
        }
        let mut w = self.symmetric(len + 1);
        w.truncate(len);
        w
    }
}

/// Sum of cosine terms with alternating signs: `Σ (-1)^k a_k cos(2πk n/(m-1))`.
fn general_cosine(m: usize, coeffs: &[f64]) -> Vec<f64> {
    let denom = (m - 1) as f64;
    (0..m)
        .map(|n| {
            let x = 2.0 * PI * n as f64 / denom;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

impl fmt::Display for WindowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowShape {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self> {
        let shape = match s.trim().to_ascii_lowercase().as_str() {
            "boxcar" | "box" | "rect" | "rectangular" | "ones" => WindowShape::Boxcar,
            "triang" | "triangle" | "tri" => WindowShape::Triang,
            "blackman" | "black" | "blk" => WindowShape::Blackman,
            "hamming" | "hamm" | "ham" => WindowShape::Hamming,
            "hann" | "han" | "hanning" => WindowShape::Hann,
            "bartlett" | "bart" | "brt" => WindowShape::Bartlett,
            "flattop" | "flat" | "flt" => WindowShape::Flattop,
            "parzen" | "parz" | "par" => WindowShape::Parzen,
            "bohman" | "bman" | "bmn" => WindowShape::Bohman,
            "blackmanharris" | "blackharr" | "bkh" => WindowShape::BlackmanHarris,
            "nuttall" | "nutl" | "nut" => WindowShape::Nuttall,
            "barthann" | "brthan" | "bth" => WindowShape::Barthann,
            _ => return Err(SpectrumError::UnknownWindow(s.to_string())),
        };
        Ok(shape)
    }
}

// ---------------------------------------------------------------------------
// Smoothing
// ---------------------------------------------------------------------------

/// Unit-sum kernel of the given shape and length.
pub fn normalized_window(shape: WindowShape, len: usize) -> Result<Vec<f64>> {
    if len == 0 {
        return Err(SpectrumError::InvalidWindow(
            "window length must be positive".into(),
        ));
    }
    let window = shape.periodic(len);
    let total: f64 = window.iter().sum();
    if !total.is_finite() || total.abs() < f64::EPSILON {
        return Err(SpectrumError::InvalidWindow(format!(
            "{shape} window of length {len} sums to zero"
        )));
    }
    Ok(window.into_iter().map(|w| w / total).collect())
}

/// Convolution trimmed to the length of `signal`, centred on the full output.
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let m = kernel.len();
    if n == 0 || m == 0 {
        return vec![0.0; n];
    }
    let offset = (m - 1) / 2;
    (0..n)
        .map(|i| {
            let k = i + offset;
            let j_lo = k.saturating_sub(n - 1);
            let j_hi = k.min(m - 1);
            (j_lo..=j_hi).map(|j| signal[k - j] * kernel[j]).sum()
        })
        .collect()
}

/// Smooth `flux` with a normalized window; output has the same length.
pub fn smooth(flux: &[f64], len: usize, shape: WindowShape) -> Result<Vec<f64>> {
    let window = normalized_window(shape, len)?;
    log::debug!("Smoothing {} samples with {shape}[{len}]", flux.len());
    Ok(convolve_same(flux, &window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_slice_eq(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_periodic_windows_match_reference_values() {
        assert_slice_eq(&WindowShape::Boxcar.periodic(3), &[1.0, 1.0, 1.0]);
        assert_slice_eq(&WindowShape::Hann.periodic(4), &[0.0, 0.5, 1.0, 0.5]);
        assert_slice_eq(&WindowShape::Hamming.periodic(4), &[0.08, 0.54, 1.0, 0.54]);
        assert_slice_eq(&WindowShape::Bartlett.periodic(4), &[0.0, 0.5, 1.0, 0.5]);
        assert_slice_eq(&WindowShape::Triang.periodic(2), &[0.5, 1.0]);
        assert_slice_eq(&WindowShape::Blackman.periodic(4), &[0.0, 0.34, 1.0, 0.34]);
    }

    #[test]
    fn test_symmetric_triang_even_and_odd() {
        assert_slice_eq(&WindowShape::Triang.symmetric(3), &[0.5, 1.0, 0.5]);
        assert_slice_eq(&WindowShape::Triang.symmetric(4), &[0.25, 0.75, 0.75, 0.25]);
    }

    #[test]
    fn test_symmetric_windows_peak_at_centre() {
        for shape in WindowShape::ALL {
            let w = shape.symmetric(9);
            assert_eq!(w.len(), 9);
            assert_relative_eq!(w[4], 1.0, epsilon = 1e-6);
            for i in 0..9 {
                assert_relative_eq!(w[i], w[8 - i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("boxcar".parse::<WindowShape>().unwrap(), WindowShape::Boxcar);
        assert_eq!("Hanning".parse::<WindowShape>().unwrap(), WindowShape::Hann);
        assert_eq!(
            " blackmanharris ".parse::<WindowShape>().unwrap(),
            WindowShape::BlackmanHarris
        );
        for shape in WindowShape::ALL {
            assert_eq!(shape.name().parse::<WindowShape>().unwrap(), shape);
        }
        assert!(matches!(
            "kaiser".parse::<WindowShape>(),
            Err(SpectrumError::UnknownWindow(_))
        ));
    }

    #[test]
    fn test_normalized_window_sums_to_one() {
        for shape in WindowShape::ALL {
            let w = normalized_window(shape, 7).unwrap();
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_length_window_rejected() {
        assert!(matches!(
            normalized_window(WindowShape::Boxcar, 0),
            Err(SpectrumError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_boxcar_length_one_is_identity() {
        let flux = vec![1.0, -2.5, 3.25, 0.0, 7.0];
        let smoothed = smooth(&flux, 1, WindowShape::Boxcar).unwrap();
        assert_slice_eq(&smoothed, &flux);

        // Every shape reduces to the identity at length one.
        let smoothed = smooth(&flux, 1, WindowShape::Hann).unwrap();
        assert_slice_eq(&smoothed, &flux);
    }

    #[test]
    fn test_convolve_same_alignment() {
        let boxcar3 = normalized_window(WindowShape::Boxcar, 3).unwrap();
        let out = convolve_same(&[0.0, 0.0, 3.0, 0.0, 0.0], &boxcar3);
        assert_slice_eq(&out, &[0.0, 1.0, 1.0, 1.0, 0.0]);

        let boxcar2 = normalized_window(WindowShape::Boxcar, 2).unwrap();
        let out = convolve_same(&[0.0, 0.0, 2.0, 0.0], &boxcar2);
        assert_slice_eq(&out, &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_kernel_longer_than_signal() {
        let out = convolve_same(&[3.0, 3.0], &[0.25, 0.25, 0.25, 0.25]);
        assert_slice_eq(&out, &[1.5, 1.5]);
    }

    #[test]
    fn test_smoothing_preserves_constant_interior() {
        let flux = vec![2.0; 50];
        let smoothed = smooth(&flux, 5, WindowShape::Hamming).unwrap();
        assert_eq!(smoothed.len(), 50);
        for v in &smoothed[2..48] {
            assert_relative_eq!(*v, 2.0, epsilon = 1e-12);
        }
    }
}
