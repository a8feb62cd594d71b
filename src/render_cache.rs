//! Staged render caches.
//!
//! A renderer owns one `Stage` per derived artifact (levels, styles, geometry,
//! pixel buffer). Each stage carries its own valid flag. Setters on renderer
//! state clear the flags of the stages that read that state; upstream shared
//! objects are tracked through a `RevisionWatch` per dependency edge.

use tracing::debug;

/// A cached value with its own validity flag.
#[derive(Clone, Debug, Default)]
pub struct Stage<T> {
    value: T,
    valid: bool,
    recomputes: u64,
}

impl<T> Stage<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            valid: false,
            recomputes: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Last computed value. May be stale if `is_valid` is false.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores a freshly computed value and marks the stage valid.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.valid = true;
        self.recomputes += 1;
    }

    /// Number of times this stage has been recomputed.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Recomputes the value if the stage is invalid.
    pub fn ensure(&mut self, name: &'static str, compute: impl FnOnce() -> T) -> &T {
        if !self.valid {
            debug!(stage = name, "recomputing render stage");
            let value = compute();
            self.set(value);
        }
        &self.value
    }

    /// Fallible variant of `ensure`; the stage stays invalid on error.
    pub fn try_ensure<E>(&mut self, name: &'static str, compute: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if !self.valid {
            debug!(stage = name, "recomputing render stage");
            let value = compute()?;
            self.set(value);
        }
        Ok(&self.value)
    }
}

/// Remembers the upstream revisions a stage was last computed from.
#[derive(Clone, Debug, Default)]
pub struct RevisionWatch {
    seen: Option<Vec<u64>>,
}

impl RevisionWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `current` and returns true if it differs from the last recorded
    /// revisions (or if nothing was recorded yet).
    pub fn changed(&mut self, current: &[u64]) -> bool {
        if self.seen.as_deref() == Some(current) {
            return false;
        }
        self.seen = Some(current.to_vec());
        true
    }

    /// Forgets the recorded revisions, so the next check reports a change.
    pub fn reset(&mut self) {
        self.seen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_runs_once_until_invalidated() {
        let mut stage: Stage<Vec<f64>> = Stage::default();
        let mut calls = 0;
        stage.ensure("levels", || {
            calls += 1;
            vec![1.0]
        });
        stage.ensure("levels", || {
            calls += 1;
            vec![2.0]
        });
        assert_eq!(calls, 1);
        assert_eq!(stage.get(), &vec![1.0]);

        stage.invalidate();
        stage.ensure("levels", || vec![3.0]);
        assert_eq!(stage.get(), &vec![3.0]);
        assert_eq!(stage.recomputes(), 2);
    }

    #[test]
    fn failed_recompute_leaves_stage_invalid() {
        let mut stage: Stage<u32> = Stage::new(0);
        let r: Result<&u32, &str> = stage.try_ensure("geometry", || Err("boom"));
        assert!(r.is_err());
        assert!(!stage.is_valid());
    }

    #[test]
    fn watch_reports_first_and_changed() {
        let mut w = RevisionWatch::new();
        assert!(w.changed(&[1, 2]));
        assert!(!w.changed(&[1, 2]));
        assert!(w.changed(&[1, 3]));
        w.reset();
        assert!(w.changed(&[1, 3]));
    }
}
