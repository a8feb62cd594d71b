use serde::{Deserialize, Serialize};

/// Declared ordering of a 1D source's values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
    #[default]
    None,
}

/// Whether each element of a source is a scalar or a color tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDimension {
    #[default]
    Scalar,
    Image,
}

/// `n` evenly spaced values from `low` to `high` inclusive.
pub fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// Indices `0..n` as floats.
pub fn arange(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Min and max over the finite entries whose mask bit is set.
pub fn finite_min_max(values: &[f64], mask: Option<&[bool]>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        if let Some(m) = mask {
            if !m.get(i).copied().unwrap_or(false) {
                continue;
            }
        }
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}
