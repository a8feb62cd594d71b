use glam::DVec2;

use crate::error::PlotResult;
use crate::mapper::Mapper;
use crate::transform::{Orientation, PlotTransform};

/// Smallest span a zoom may leave a range with.
pub const MIN_SPAN: f64 = 1e-9;

/// ViewController holds the arithmetic of interactions (zoom, pan, box
/// selection) independently of any event source, so tools stay thin and the
/// math stays testable.
pub struct ViewController;

impl ViewController {
    /// Data bounds after dragging the view by `delta_pixels` along the
    /// mapper's screen axis. The content follows the pointer, so the bounds
    /// move the opposite way. Log mappers pan in log space.
    pub fn pan_bounds(mapper: &mut dyn Mapper, delta_pixels: f64) -> PlotResult<(f64, f64)> {
        let (low_pos, high_pos) = mapper.screen_bounds();
        let low = mapper.map_data(low_pos - delta_pixels)?;
        let high = mapper.map_data(high_pos - delta_pixels)?;
        Ok((low, high))
    }

    /// Pans the mapper's range in place.
    pub fn pan_mapper(mapper: &mut dyn Mapper, delta_pixels: f64) -> PlotResult<()> {
        if delta_pixels == 0.0 {
            return Ok(());
        }
        let (low, high) = Self::pan_bounds(mapper, delta_pixels)?;
        mapper.range().write().set_bounds(low, high);
        Ok(())
    }

    /// Scales `bounds` by `factor` about `pivot`, keeping the pivot fixed.
    /// The factor is limited so the span never drops below `MIN_SPAN`.
    pub fn zoom_bounds_at(bounds: (f64, f64), pivot: f64, factor: f64) -> (f64, f64) {
        let (low, high) = bounds;
        let span = high - low;
        let mut factor = factor;
        if span > 0.0 && span * factor < MIN_SPAN {
            factor = MIN_SPAN / span;
        }
        (pivot - (pivot - low) * factor, pivot + (high - pivot) * factor)
    }

    /// Continuous drag zoom: 5% per 10 pixels at `speed` 1. A positive delta
    /// (pointer moving toward larger screen coordinates) zooms in.
    pub fn drag_zoom_factor(previous: f64, current: f64, speed: f64) -> f64 {
        1.0 - speed * (current - previous) * (0.05 / 10.0)
    }

    /// True when `next` would leave the `original` extent or collapse.
    pub fn zoom_limit_reached(original: (f64, f64), next: (f64, f64)) -> bool {
        let (ol, oh) = (original.0.min(original.1), original.0.max(original.1));
        let (nl, nh) = next;
        !(nh - nl > MIN_SPAN) || nl < ol || nh > oh || !nl.is_finite() || !nh.is_finite()
    }

    /// Ordered data interval under two screen positions of one mapper.
    pub fn screen_interval_to_data(mapper: &mut dyn Mapper, a: f64, b: f64) -> PlotResult<(f64, f64)> {
        let da = mapper.map_data(a)?;
        let db = mapper.map_data(b)?;
        Ok(if da <= db { (da, db) } else { (db, da) })
    }

    /// Ordered (index, value) data bounds of a screen box.
    pub fn screen_box_to_data(transform: &PlotTransform, start: DVec2, end: DVec2) -> PlotResult<((f64, f64), (f64, f64))> {
        let (index_axis, value_axis) = match transform.orientation {
            Orientation::H => ((start.x, end.x), (start.y, end.y)),
            Orientation::V => ((start.y, end.y), (start.x, end.x)),
        };
        let index = Self::screen_interval_to_data(&mut *transform.index_mapper.write(), index_axis.0, index_axis.1)?;
        let value = Self::screen_interval_to_data(&mut *transform.value_mapper.write(), value_axis.0, value_axis.1)?;
        Ok((index, value))
    }
}
