use chaco_core::data_types::SortOrder;
use chaco_core::mapper::{shared_mapper, SharedRange2D};
use chaco_core::{
    shared_range, shared_source, ArrayDataSource, DataRange1D, DataRange2D, GridDataSource, GridMapper,
    LinearMapper, LogMapper, Mapper, PlotError, PolarMapper, ScaleKind,
};
use glam::DVec2;
use parking_lot::RwLock;
use rand::Rng;
use std::sync::Arc;

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol * b.abs().max(1.0), "{} != {}", a, b);
}

#[test]
fn test_linear_maps_endpoints() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 100.0));
    let mut mapper = LinearMapper::with_screen_bounds(range, 0.0, 500.0);
    assert_eq!(mapper.map_screen(&[0.0, 50.0, 100.0]).unwrap(), vec![0.0, 250.0, 500.0]);
    assert_eq!(mapper.map_data(250.0).unwrap(), 50.0);
    assert_eq!(mapper.scale(), 5.0);
}

#[test]
fn test_linear_round_trip_random() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let low = rng.random_range(-1e4..1e4);
        let high = low + rng.random_range(1e-3..1e4);
        let range = shared_range(DataRange1D::with_bounds(low, high));
        let mut mapper = LinearMapper::with_screen_bounds(range, 12.0, 812.0);
        for _ in 0..20 {
            let x = rng.random_range(low..=high);
            let screen = mapper.map_screen_value(x).unwrap();
            assert_close(mapper.map_data(screen).unwrap(), x, 1e-9);
        }
    }
}

#[test]
fn test_log_round_trip_random() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let low = rng.random_range(1e-3..1e3);
        let high = low * rng.random_range(1.5..1e4);
        let range = shared_range(DataRange1D::with_bounds(low, high));
        let mut mapper = LogMapper::with_screen_bounds(range, 400.0, 0.0);
        for _ in 0..20 {
            let x = rng.random_range(low..=high);
            let screen = mapper.map_screen_value(x).unwrap();
            assert!(screen > -1e-9 && screen < 400.0 + 1e-9);
            assert_close(mapper.map_data(screen).unwrap(), x, 1e-9);
        }
    }
}

#[test]
fn test_log_decades_are_even() {
    let range = shared_range(DataRange1D::with_bounds(1.0, 1000.0));
    let mut mapper = LogMapper::with_screen_bounds(range, 0.0, 300.0);
    let screen = mapper.map_screen(&[1.0, 10.0, 100.0, 1000.0]).unwrap();
    for (s, expected) in screen.iter().zip([0.0, 100.0, 200.0, 300.0]) {
        assert_close(*s, expected, 1e-12);
    }
}

#[test]
fn test_log_rejects_non_positive() {
    let range = shared_range(DataRange1D::with_bounds(1.0, 10.0));
    let mut mapper = LogMapper::with_screen_bounds(range, 0.0, 100.0);
    assert!(matches!(mapper.map_screen(&[5.0, 0.0]), Err(PlotError::Domain(_))));
    assert!(matches!(mapper.map_screen(&[-1.0]), Err(PlotError::Domain(_))));

    let bad_range = shared_range(DataRange1D::with_bounds(-1.0, 10.0));
    let mut mapper = LogMapper::with_screen_bounds(bad_range, 0.0, 100.0);
    assert!(matches!(mapper.map_data(50.0), Err(PlotError::Domain(_))));
}

#[test]
fn test_degenerate_data_range_maps_to_low_pos() {
    let range = shared_range(DataRange1D::with_bounds(3.0, 3.0));
    let mut mapper = LinearMapper::with_screen_bounds(range, 20.0, 200.0);
    assert_eq!(mapper.map_screen(&[1.0, 3.0, 9.0]).unwrap(), vec![20.0, 20.0, 20.0]);
    assert_eq!(mapper.map_data(150.0).unwrap(), 3.0);
}

#[test]
fn test_degenerate_screen_range_maps_to_data_low() {
    let range = shared_range(DataRange1D::with_bounds(2.0, 8.0));
    let mut mapper = LinearMapper::with_screen_bounds(range, 50.0, 50.0);
    assert_eq!(mapper.map_data(10.0).unwrap(), 2.0);
    assert_eq!(mapper.map_screen(&[2.0, 8.0]).unwrap(), vec![50.0, 50.0]);
}

#[test]
fn test_flipped_screen_bounds() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 10.0));
    let mut mapper = LinearMapper::with_screen_bounds(range, 100.0, 0.0);
    assert_eq!(mapper.map_screen(&[0.0, 10.0]).unwrap(), vec![100.0, 0.0]);
    assert_eq!(mapper.map_data(25.0).unwrap(), 7.5);
}

#[test]
fn test_cache_invalidated_by_range_change() {
    let source = shared_source(ArrayDataSource::new(vec![0.0, 10.0]));
    let range = shared_range(DataRange1D::from_sources([source.clone()]));
    let mut mapper = LinearMapper::with_screen_bounds(range.clone(), 0.0, 100.0);
    let revision = mapper.sync();
    assert!(mapper.is_cache_valid());
    assert_eq!(mapper.sync(), revision);

    source.write().set_data(vec![0.0, 20.0]).unwrap();
    let moved = mapper.sync();
    assert!(moved > revision);
    assert_eq!(mapper.map_screen_value(20.0).unwrap(), 100.0);

    range.write().set_bounds(0.0, 40.0);
    assert!(mapper.sync() > moved);
    assert_eq!(mapper.map_screen_value(20.0).unwrap(), 50.0);

    mapper.set_screen_bounds(0.0, 200.0);
    assert!(!mapper.is_cache_valid());
    assert_eq!(mapper.map_screen_value(20.0).unwrap(), 100.0);
}

#[test]
fn test_scale_kind_parsing() {
    assert_eq!("linear".parse::<ScaleKind>().unwrap(), ScaleKind::Linear);
    assert_eq!("log".parse::<ScaleKind>().unwrap(), ScaleKind::Log);
    assert!(matches!("cubic".parse::<ScaleKind>(), Err(PlotError::Config(_))));

    let range = shared_range(DataRange1D::with_bounds(1.0, 10.0));
    let mapper = ScaleKind::Log.build(range);
    assert_eq!(mapper.read().kind(), ScaleKind::Log);
}

#[test]
fn test_shared_mapper_sees_screen_changes() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 1.0));
    let mapper = shared_mapper(LinearMapper::new(range));
    let other = mapper.clone();
    mapper.write().set_screen_bounds(0.0, 10.0);
    assert_eq!(other.write().map_screen_value(0.5).unwrap(), 5.0);
}

#[test]
fn test_polar_places_points_around_center() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 1.0));
    let mut mapper = PolarMapper::new(range);
    mapper.set_screen_bounds(0.0, 100.0);
    let points = mapper
        .map_screen_polar(&[1.0, 0.5], &[0.0, std::f64::consts::FRAC_PI_2], DVec2::new(200.0, 200.0))
        .unwrap();
    assert_close(points[0].x, 300.0, 1e-12);
    assert_close(points[0].y, 200.0, 1e-12);
    assert_close(points[1].x, 200.0, 1e-12);
    assert_close(points[1].y, 250.0, 1e-12);
    assert!(mapper.map_screen_polar(&[1.0], &[], DVec2::ZERO).is_err());
}

#[test]
fn test_grid_mapper_maps_points_and_cells() {
    let grid = GridDataSource::new(
        vec![0.0, 1.0, 2.0, 3.0],
        vec![0.0, 1.0],
        (SortOrder::Ascending, SortOrder::Ascending),
    );
    let shared_grid = Arc::new(RwLock::new(grid));
    let range: SharedRange2D = Arc::new(RwLock::new(DataRange2D::new()));
    range.write().add(shared_grid.clone());

    let mut mapper = GridMapper::new(range);
    mapper.set_screen_bounds((0.0, 300.0), (100.0, 0.0));
    let screen = mapper.map_screen(&[DVec2::new(3.0, 0.0), DVec2::new(1.5, 1.0)]).unwrap();
    assert_eq!(screen, vec![DVec2::new(300.0, 100.0), DVec2::new(150.0, 0.0)]);
    assert_eq!(mapper.map_data(DVec2::new(150.0, 50.0)).unwrap(), DVec2::new(1.5, 0.5));

    let grid = shared_grid.read();
    assert_eq!(mapper.map_index(DVec2::new(10.0, 90.0), &grid, 4, 2), Some((0, 0)));
    assert_eq!(mapper.map_index(DVec2::new(299.0, 10.0), &grid, 4, 2), Some((3, 1)));
    assert_eq!(mapper.map_index(DVec2::new(-5.0, 50.0), &grid, 4, 2), None);
}
