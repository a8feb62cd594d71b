//! Marching-squares contour tracing and filled band extraction over a
//! rectilinear scalar grid. All geometry is produced in data space.

use std::collections::{HashMap, VecDeque};

use glam::DVec2;
use rayon::prelude::*;

use crate::data_types::{linspace, Levels};
use crate::error::{PlotError, PlotResult};

/// Row-major scalar field on the grid `xs × ys` (`values[row * width + col]`
/// sits at `(xs[col], ys[row])`).
#[derive(Clone, Copy, Debug)]
pub struct ScalarField<'a> {
    values: &'a [f64],
    xs: &'a [f64],
    ys: &'a [f64],
}

impl<'a> ScalarField<'a> {
    pub fn new(values: &'a [f64], xs: &'a [f64], ys: &'a [f64]) -> PlotResult<Self> {
        if values.len() != xs.len() * ys.len() {
            return Err(PlotError::Shape {
                expected: vec![ys.len(), xs.len()],
                actual: vec![values.len()],
            });
        }
        Ok(Self { values, xs, ys })
    }

    pub fn width(&self) -> usize {
        self.xs.len()
    }

    pub fn height(&self) -> usize {
        self.ys.len()
    }

    fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.xs.len() + col]
    }

    fn point(&self, row: usize, col: usize) -> DVec2 {
        DVec2::new(self.xs[col], self.ys[row])
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (w, h) = (self.width(), self.height());
        (0..h.saturating_sub(1)).flat_map(move |r| (0..w.saturating_sub(1)).map(move |c| (r, c)))
    }

    /// Corner (position, value) pairs of a cell, in ring order.
    fn cell_ring(&self, r: usize, c: usize) -> [(DVec2, f64); 4] {
        [
            (self.point(r, c), self.value(r, c)),
            (self.point(r, c + 1), self.value(r, c + 1)),
            (self.point(r + 1, c + 1), self.value(r + 1, c + 1)),
            (self.point(r + 1, c), self.value(r + 1, c)),
        ]
    }
}

/// One connected contour line.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    pub points: Vec<DVec2>,
    /// The last point connects back to the first.
    pub closed: bool,
}

/// A cell edge: `H(r, c)` joins (r, c)-(r, c+1), `V(r, c)` joins (r, c)-(r+1, c).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

fn crossing(field: &ScalarField, edge: Edge, level: f64) -> DVec2 {
    let ((r0, c0), (r1, c1)) = match edge {
        Edge::H(r, c) => ((r, c), (r, c + 1)),
        Edge::V(r, c) => ((r, c), (r + 1, c)),
    };
    let (v0, v1) = (field.value(r0, c0), field.value(r1, c1));
    let (p0, p1) = (field.point(r0, c0), field.point(r1, c1));
    let t = if (v1 - v0).abs() < f64::EPSILON {
        0.5
    } else {
        ((level - v0) / (v1 - v0)).clamp(0.0, 1.0)
    };
    p0 + (p1 - p0) * t
}

/// Unordered segments of the `level` isoline, as pairs of crossed edges.
fn march(field: &ScalarField, level: f64) -> Vec<(Edge, Edge)> {
    let mut segments = Vec::new();
    for (r, c) in field.cells() {
        let [tl, tr, br, bl] = field.cell_ring(r, c).map(|(_, v)| v);
        if tl.is_nan() || tr.is_nan() || br.is_nan() || bl.is_nan() {
            continue;
        }
        let mut case = 0u8;
        if tl >= level {
            case |= 1;
        }
        if tr >= level {
            case |= 2;
        }
        if br >= level {
            case |= 4;
        }
        if bl >= level {
            case |= 8;
        }
        let top = Edge::H(r, c);
        let bottom = Edge::H(r + 1, c);
        let left = Edge::V(r, c);
        let right = Edge::V(r, c + 1);
        let center_high = (tl + tr + br + bl) / 4.0 >= level;
        match case {
            0 | 15 => {}
            1 | 14 => segments.push((left, top)),
            2 | 13 => segments.push((top, right)),
            3 | 12 => segments.push((left, right)),
            4 | 11 => segments.push((right, bottom)),
            6 | 9 => segments.push((top, bottom)),
            7 | 8 => segments.push((left, bottom)),
            5 if center_high => {
                segments.push((top, right));
                segments.push((left, bottom));
            }
            5 => {
                segments.push((left, top));
                segments.push((right, bottom));
            }
            10 if center_high => {
                segments.push((left, top));
                segments.push((right, bottom));
            }
            10 => {
                segments.push((top, right));
                segments.push((left, bottom));
            }
            _ => {}
        }
    }
    segments
}

/// Chains segments sharing an edge into traces.
fn join(segments: &[(Edge, Edge)]) -> Vec<(Vec<Edge>, bool)> {
    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        by_edge.entry(*a).or_default().push(i);
        by_edge.entry(*b).or_default().push(i);
    }
    let mut used = vec![false; segments.len()];

    let next = |from: Edge, used: &mut Vec<bool>| -> Option<Edge> {
        let j = *by_edge.get(&from)?.iter().find(|&&j| !used[j])?;
        used[j] = true;
        let (a, b) = segments[j];
        Some(if a == from { b } else { a })
    };

    let mut chains = Vec::new();
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let (a, b) = segments[i];
        let mut chain = VecDeque::from([a, b]);
        let mut closed = false;
        while let Some(&tail) = chain.back() {
            match next(tail, &mut used) {
                Some(e) if Some(&e) == chain.front() => {
                    closed = true;
                    break;
                }
                Some(e) => chain.push_back(e),
                None => break,
            }
        }
        if !closed {
            while let Some(&head) = chain.front() {
                match next(head, &mut used) {
                    Some(e) => chain.push_front(e),
                    None => break,
                }
            }
        }
        chains.push((chain.into_iter().collect(), closed));
    }
    chains
}

/// Traces of the isoline at `level`. Cells touching a NaN are skipped.
pub fn trace_level(field: &ScalarField, level: f64) -> Vec<Trace> {
    let segments = march(field, level);
    join(&segments)
        .into_iter()
        .map(|(edges, closed)| Trace {
            points: edges.into_iter().map(|e| crossing(field, e, level)).collect(),
            closed,
        })
        .collect()
}

/// Traces for every level, computed in parallel. Output order follows `levels`.
pub fn trace_levels(field: &ScalarField, levels: &[f64]) -> Vec<Vec<Trace>> {
    levels.par_iter().map(|&level| trace_level(field, level)).collect()
}

type RingPoint = (DVec2, f64);

/// Sutherland-Hodgman clip of a ring against a value threshold, with values
/// interpolated linearly along edges.
fn clip_ring(ring: &[RingPoint], threshold: f64, keep_above: bool) -> Vec<RingPoint> {
    let inside = |v: f64| if keep_above { v >= threshold } else { v <= threshold };
    let cut = |p: RingPoint, q: RingPoint| -> RingPoint {
        let t = (threshold - p.1) / (q.1 - p.1);
        (p.0 + (q.0 - p.0) * t, threshold)
    };
    let n = ring.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let cur = ring[i];
        let prev = ring[(i + n - 1) % n];
        match (inside(prev.1), inside(cur.1)) {
            (true, true) => out.push(cur),
            (false, true) => {
                out.push(cut(prev, cur));
                out.push(cur);
            }
            (true, false) => out.push(cut(prev, cur)),
            (false, false) => {}
        }
    }
    out
}

/// Filled polygons covering the region where `low <= value <= high`.
///
/// Each grid cell is clipped against the band on its own, so the band comes
/// out as a set of small convex-ish pieces rather than one merged outline.
pub fn band_polygons(field: &ScalarField, low: f64, high: f64) -> Vec<Vec<DVec2>> {
    let mut polygons = Vec::new();
    for (r, c) in field.cells() {
        let ring = field.cell_ring(r, c);
        if ring.iter().any(|(_, v)| v.is_nan()) {
            continue;
        }
        if ring.iter().all(|(_, v)| *v >= low && *v <= high) {
            polygons.push(ring.iter().map(|(p, _)| *p).collect());
            continue;
        }
        if ring.iter().all(|(_, v)| *v < low) || ring.iter().all(|(_, v)| *v > high) {
            continue;
        }
        let clipped = clip_ring(&clip_ring(&ring, low, true), high, false);
        if clipped.len() >= 3 {
            polygons.push(clipped.into_iter().map(|(p, _)| p).collect());
        }
    }
    polygons
}

/// Band polygons between each pair of consecutive levels, in parallel.
pub fn band_polygons_for_levels(field: &ScalarField, levels: &[f64]) -> Vec<Vec<Vec<DVec2>>> {
    levels
        .par_windows(2)
        .map(|w| band_polygons(field, w[0], w[1]))
        .collect()
}

/// Rounds a span to 1, 2, 5 or 10 times a power of ten.
pub fn nice_number(span: f64, round: bool) -> f64 {
    let exponent = span.log10().floor();
    let fraction = span / 10f64.powf(exponent);
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10f64.powf(exponent)
}

/// Round-valued ticks inside `[min, max]`, roughly `count` of them.
pub fn nice_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if !(max > min) || !min.is_finite() || !max.is_finite() {
        return if min.is_finite() { vec![min] } else { vec![] };
    }
    if count < 2 {
        return vec![(min + max) / 2.0];
    }
    let spacing = nice_number(nice_number(max - min, false) / (count - 1) as f64, true);
    let first = (min / spacing).ceil() as i64;
    let last = (max / spacing).floor() as i64;
    (first..=last).map(|k| k as f64 * spacing).collect()
}

pub const AUTO_LEVEL_COUNT: usize = 10;

/// Resolves requested levels against the value range `[low, high]`.
pub fn resolve_levels(levels: &Levels, low: f64, high: f64) -> Vec<f64> {
    match levels {
        Levels::Auto => nice_ticks(low, high, AUTO_LEVEL_COUNT),
        Levels::Count(n) => {
            if low.is_finite() && high.is_finite() {
                linspace(low, high, *n)
            } else {
                vec![]
            }
        }
        Levels::Explicit(values) => {
            let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
            v.sort_by(f64::total_cmp);
            v
        }
    }
}
