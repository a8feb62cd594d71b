use chaco_core::data_types::{bracket_constant, BoundSetting, SortOrder};
use chaco_core::{shared_range, shared_source, ArrayDataSource, DataRange1D, DataRange2D, DataSource, GridDataSource};
use parking_lot::RwLock;
use std::sync::Arc;

fn constant_range(v: f64) -> (f64, f64) {
    let source = shared_source(ArrayDataSource::new(vec![v, v, v]));
    DataRange1D::from_sources([source]).bounds()
}

#[test]
fn test_auto_bounds_follow_source() {
    let source = shared_source(ArrayDataSource::new(vec![3.0, -2.0, 7.5, 1.0]));
    let range = DataRange1D::from_sources([source]);
    assert_eq!(range.bounds(), (-2.0, 7.5));
}

#[test]
fn test_literal_low_overrides_data() {
    let source = shared_source(ArrayDataSource::new(vec![3.0, -2.0, 7.5, 1.0]));
    let mut range = DataRange1D::from_sources([source]);
    range.set_low_setting(BoundSetting::Value(-10.0));
    assert_eq!(range.low(), -10.0);
    assert_eq!(range.high(), 7.5);

    range.set_high(2.0);
    assert_eq!(range.bounds(), (-10.0, 2.0));

    range.reset();
    assert_eq!(range.bounds(), (-2.0, 7.5));
}

#[test]
fn test_constant_source_brackets() {
    assert_eq!(constant_range(3.14), (1.0, 10.0));
    assert_eq!(constant_range(31.4), (10.0, 100.0));
    assert_eq!(constant_range(0.03), (-1.0, 1.0));
    assert_eq!(constant_range(-0.03), (-1.0, 1.0));
}

#[test]
fn test_bracket_negative_mirrors() {
    assert_eq!(bracket_constant(-3.14), (-10.0, -1.0));
    // An exact power of ten still gets a non-empty decade.
    assert_eq!(bracket_constant(10.0), (10.0, 100.0));
}

#[test]
fn test_clip_data_preserves_order() {
    let range = DataRange1D::with_bounds(2.0, 10.0);
    let data = [1.0, 3.0, 4.0, 9.8, 10.2, 12.0];
    assert_eq!(range.clip_data(&data), vec![3.0, 4.0, 9.8]);
    assert_eq!(range.clip_data(&[2.0, 10.0]), vec![2.0, 10.0]);
}

#[test]
fn test_mask_data_follows_input_order() {
    let range = DataRange1D::with_bounds(2.0, 10.0);
    let data = [1.0, 3.0, 4.0, 9.8, 10.2, 12.0];
    let mask = range.mask_data(&data);
    assert_eq!(mask, vec![false, true, true, true, false, false]);

    let reversed: Vec<f64> = data.iter().rev().copied().collect();
    let reversed_mask: Vec<bool> = mask.iter().rev().copied().collect();
    assert_eq!(range.mask_data(&reversed), reversed_mask);
}

#[test]
fn test_bound_data_non_monotonic() {
    let range = DataRange1D::with_bounds(2.9, 6.1);
    let data = [
        -5.0, -4.0, -7.0, -8.0, -2.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 8.0, 9.0, 10.0, 9.0, 8.0,
    ];
    assert_eq!(range.bound_data(&data), Some((7, 11)));
    assert_eq!(range.bound_data(&[0.0, 1.0]), None);
}

#[test]
fn test_empty_range_is_unbounded() {
    let range = DataRange1D::new();
    assert_eq!(range.low(), f64::NEG_INFINITY);
    assert_eq!(range.high(), f64::INFINITY);
    assert!(range.contains(1e300));
    assert_eq!(range.clip_data(&[1.0, -1.0]), vec![1.0, -1.0]);
}

#[test]
fn test_multiple_sources_union() {
    let a = shared_source(ArrayDataSource::new(vec![0.0, 5.0]));
    let b = shared_source(ArrayDataSource::new(vec![-3.0, 2.0]));
    let mut range = DataRange1D::from_sources([a.clone()]);
    range.add(b.clone());
    assert_eq!(range.bounds(), (-3.0, 5.0));

    range.remove(&b);
    assert_eq!(range.bounds(), (0.0, 5.0));
    assert_eq!(range.sources().len(), 1);

    // Adding the same handle twice registers it once.
    range.add(a);
    assert_eq!(range.sources().len(), 1);
}

#[test]
fn test_masked_and_nan_values_ignored() {
    let mut source = ArrayDataSource::new(vec![100.0, 1.0, f64::NAN, 4.0]);
    source.set_mask(vec![false, true, true, true]).unwrap();
    let range = DataRange1D::from_sources([shared_source(source)]);
    assert_eq!(range.bounds(), (1.0, 4.0));
}

#[test]
fn test_update_picks_up_source_changes() {
    let source = shared_source(ArrayDataSource::new(vec![0.0, 1.0]));
    let mut range = DataRange1D::from_sources([source.clone()]);
    let revision = range.revision();

    assert!(!range.update());
    source.write().set_data(vec![0.0, 20.0]).unwrap();
    assert!(range.update());
    assert_eq!(range.bounds(), (0.0, 20.0));
    assert!(range.revision() > revision);
}

#[test]
fn test_low_above_auto_high_collapses() {
    let source = shared_source(ArrayDataSource::new(vec![0.0, 1.0]));
    let mut range = DataRange1D::from_sources([source]);
    range.set_low(5.0);
    assert!(range.low() <= range.high());
    assert_eq!(range.bounds(), (5.0, 5.0));
}

#[test]
fn test_inverted_literal_bounds_are_swapped() {
    let range = DataRange1D::with_bounds(8.0, 2.0);
    assert_eq!(range.bounds(), (2.0, 8.0));
}

#[test]
fn test_shared_range_seen_by_all_holders() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 1.0));
    let other = range.clone();
    range.write().set_bounds(-1.0, 3.0);
    assert_eq!(other.read().bounds(), (-1.0, 3.0));
}

#[test]
fn test_range2d_from_grid() {
    let grid = Arc::new(RwLock::new(GridDataSource::new(
        vec![0.0, 1.0, 2.0],
        vec![10.0, 20.0],
        (SortOrder::Ascending, SortOrder::Ascending),
    )));
    let mut range = DataRange2D::new();
    range.add(grid.clone());
    assert_eq!(range.low(), (0.0, 10.0));
    assert_eq!(range.high(), (2.0, 20.0));

    range.set_bounds((-1.0, 0.0), (1.0, 5.0));
    assert_eq!(range.low(), (-1.0, 0.0));
    assert_eq!(range.high(), (1.0, 5.0));

    range.reset();
    range.remove(&grid);
    assert_eq!(range.low(), (f64::NEG_INFINITY, f64::NEG_INFINITY));
}
