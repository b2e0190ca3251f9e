// ---------------------------------------------------------------------------
// Padded display ranges
// ---------------------------------------------------------------------------

/// Which side(s) of a range receive padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    Both,
    Upper,
}

/// Expand `[lo, hi]` outward by `fraction` of its span.
///
/// A zero-width range stays zero-width; there is no span to scale from.
pub fn embiggen(range: [f64; 2], fraction: f64, mode: PadMode) -> [f64; 2] {
    let [lo, hi] = range;
    let delta = (hi - lo).abs() * fraction;
    match mode {
        PadMode::Both => [lo - delta, hi + delta],
        PadMode::Upper => [lo, hi + delta],
    }
}

/// Finite min/max of a sequence, `None` if it has no finite values.
pub fn finite_extent<I>(values: I) -> Option<[f64; 2]>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}
