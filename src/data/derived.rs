use std::cell::OnceCell;

// ---------------------------------------------------------------------------
// DerivedCache – display metadata computed on first access
// ---------------------------------------------------------------------------

/// Memoized display metadata for one record.
///
/// Each cell is filled at most once until [`DerivedCache::invalidate`] is
/// called. The owning record invalidates on every flux mutation, so a value
/// read from here always reflects the current flux.
#[derive(Debug, Clone, Default)]
pub struct DerivedCache {
    wave_unit: OnceCell<String>,
    flux_unit: OnceCell<String>,
    wave_range: OnceCell<[f64; 2]>,
    flux_range: OnceCell<[f64; 2]>,
}

impl DerivedCache {
    pub fn wave_unit(&self, compute: impl FnOnce() -> String) -> &str {
        self.wave_unit.get_or_init(compute)
    }

    pub fn flux_unit(&self, compute: impl FnOnce() -> String) -> &str {
        self.flux_unit.get_or_init(compute)
    }

    pub fn wave_range(&self, compute: impl FnOnce() -> [f64; 2]) -> [f64; 2] {
        *self.wave_range.get_or_init(compute)
    }

    pub fn flux_range(&self, compute: impl FnOnce() -> [f64; 2]) -> [f64; 2] {
        *self.flux_range.get_or_init(compute)
    }

    /// Drop the flux-dependent values. Units come from the header and survive.
    pub fn invalidate(&mut self) {
        self.wave_range = OnceCell::new();
        self.flux_range = OnceCell::new();
    }

    /// Whether any flux-dependent value is currently cached.
    #[cfg(test)]
    pub fn has_ranges(&self) -> bool {
        self.wave_range.get().is_some() || self.flux_range.get().is_some()
    }
}
