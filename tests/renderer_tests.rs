use chaco_core::data_types::{LinePlotConfig, LineRenderStyle, PolygonPlotConfig};
use chaco_core::mapper::shared_mapper;
use chaco_core::plot_types::{ColormappedScatterPlot, LinePlot, PolygonPlot, QuiverPlot, ScatterPlot};
use chaco_core::rendering::{DrawCommand, Path};
use chaco_core::transform::Orientation;
use chaco_core::{
    shared_range, shared_source, ArrayDataSource, Color, ColorMapper, DataRange1D, DataSource, LinearMapper,
    MultiArrayDataSource, Palette, PlotRenderer, PlotTransform, RecordingContext, SharedSource,
};
use glam::DVec2;
use parking_lot::RwLock;
use std::sync::Arc;

/// Both axes map [0, 10] onto [0, 100]; the value axis optionally grows upward.
fn transform(flip_value: bool) -> PlotTransform {
    let index = LinearMapper::with_screen_bounds(shared_range(DataRange1D::with_bounds(0.0, 10.0)), 0.0, 100.0);
    let (lo, hi) = if flip_value { (100.0, 0.0) } else { (0.0, 100.0) };
    let value = LinearMapper::with_screen_bounds(shared_range(DataRange1D::with_bounds(0.0, 10.0)), lo, hi);
    PlotTransform::new(shared_mapper(index), shared_mapper(value))
}

fn source(values: &[f64]) -> SharedSource {
    shared_source(ArrayDataSource::new(values.to_vec()))
}

fn points(xy: &[(f64, f64)]) -> Vec<DVec2> {
    xy.iter().map(|(x, y)| DVec2::new(*x, *y)).collect()
}

#[test]
fn test_line_maps_points() {
    let mut line = LinePlot::new(source(&[0.0, 1.0, 2.0]), source(&[0.0, 5.0, 10.0]), transform(false));
    line.ensure_rendered().unwrap();
    assert_eq!(line.screen_paths().len(), 1);
    assert_eq!(line.screen_paths()[0].points, points(&[(0.0, 0.0), (10.0, 50.0), (20.0, 100.0)]));
    assert!(line.is_cache_valid());
}

#[test]
fn test_line_breaks_at_nan() {
    let mut line = LinePlot::new(
        source(&[0.0, 1.0, 2.0, 3.0, 4.0]),
        source(&[1.0, 2.0, f64::NAN, 3.0, 4.0]),
        transform(false),
    );
    let mut gc = RecordingContext::new();
    line.render(&mut gc).unwrap();
    assert_eq!(line.runs().len(), 2);
    assert_eq!(line.runs()[0].len(), 2);
    assert_eq!(line.runs()[1].len(), 2);
    assert_eq!(gc.strokes().count(), 2);
}

#[test]
fn test_line_length_mismatch_draws_nothing() {
    let mut line = LinePlot::new(source(&[0.0, 1.0, 2.0]), source(&[0.0, 1.0]), transform(false));
    let mut gc = RecordingContext::new();
    line.render(&mut gc).unwrap();
    assert!(line.screen_paths().is_empty());
    assert_eq!(gc.strokes().count(), 0);
}

#[test]
fn test_line_render_styles() {
    let index = source(&[0.0, 1.0, 2.0]);
    let value = source(&[0.0, 1.0, 2.0]);
    let mut line = LinePlot::new(index, value, transform(false));

    line.set_render_style(LineRenderStyle::Hold);
    line.ensure_rendered().unwrap();
    let hold: Vec<Vec<DVec2>> = line.screen_paths().iter().map(|p| p.points.clone()).collect();
    assert_eq!(
        hold,
        vec![
            points(&[(0.0, 0.0), (10.0, 0.0)]),
            points(&[(10.0, 10.0), (20.0, 10.0)])
        ]
    );

    line.set_render_style(LineRenderStyle::ConnectedHold);
    assert!(!line.is_cache_valid());
    line.ensure_rendered().unwrap();
    assert_eq!(
        line.screen_paths()[0].points,
        points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0), (20.0, 20.0)])
    );
}

#[test]
fn test_line_color_change_keeps_geometry() {
    let mut line = LinePlot::new(source(&[0.0, 1.0]), source(&[0.0, 1.0]), transform(false));
    line.ensure_rendered().unwrap();
    let config = LinePlotConfig {
        color: Color::WHITE,
        ..LinePlotConfig::default()
    };
    line.set_config(config);
    assert!(line.is_cache_valid());

    let mut gc = RecordingContext::new();
    line.draw(&mut gc);
    assert!(gc.commands.contains(&DrawCommand::StrokeColor(Color::WHITE)));
}

#[test]
fn test_line_follows_source_and_range_changes() {
    let value = source(&[0.0, 1.0]);
    let t = transform(false);
    let mut line = LinePlot::new(source(&[0.0, 1.0]), value.clone(), t.clone());
    line.ensure_rendered().unwrap();

    value.write().set_data(vec![0.0, 2.0]).unwrap();
    line.ensure_rendered().unwrap();
    assert_eq!(line.screen_paths()[0].points[1], DVec2::new(10.0, 20.0));

    t.value_range().write().set_bounds(0.0, 20.0);
    line.ensure_rendered().unwrap();
    assert_eq!(line.screen_paths()[0].points[1], DVec2::new(10.0, 10.0));
}

#[test]
fn test_vertical_orientation_swaps_axes() {
    let t = transform(false).with_orientation(Orientation::V);
    let mut line = LinePlot::new(source(&[1.0]), source(&[3.0]), t);
    line.ensure_rendered().unwrap();
    assert_eq!(line.screen_paths()[0].points, points(&[(30.0, 10.0)]));
}

#[test]
fn test_scatter_culls_points_outside_ranges() {
    let mut scatter = ScatterPlot::new(
        source(&[1.0, 20.0, 5.0, 2.0]),
        source(&[1.0, 1.0, 5.0, -3.0]),
        transform(false),
    );
    let mut gc = RecordingContext::new();
    scatter.render(&mut gc).unwrap();
    assert_eq!(scatter.data_points(), points(&[(1.0, 1.0), (5.0, 5.0)]));
    assert_eq!(scatter.screen_points(), points(&[(10.0, 10.0), (50.0, 50.0)]).as_slice());
    // Square markers are filled and outlined.
    assert_eq!(gc.fills().count(), 2);
    assert_eq!(gc.strokes().count(), 2);
}

#[test]
fn test_cmap_scatter_colors_follow_color_data() {
    let color_data = source(&[0.0, 1.0, 0.5]);
    let cmap = Arc::new(RwLock::new(ColorMapper::new(
        Palette::Gray,
        shared_range(DataRange1D::from_sources([color_data.clone()])),
    )));
    let mut scatter = ColormappedScatterPlot::new(
        source(&[1.0, 2.0, 50.0]),
        source(&[1.0, 2.0, 3.0]),
        color_data.clone(),
        cmap,
        transform(false),
    );
    scatter.ensure_rendered().unwrap();
    // The third point is outside the index range.
    assert_eq!(scatter.colors(), &[Color::BLACK, Color::WHITE]);

    color_data.write().set_data(vec![1.0, 0.0, 0.5]).unwrap();
    scatter.ensure_rendered().unwrap();
    assert_eq!(scatter.colors(), &[Color::WHITE, Color::BLACK]);

    let mut gc = RecordingContext::new();
    scatter.draw(&mut gc);
    assert!(gc.commands.contains(&DrawCommand::FillColor(Color::WHITE)));
}

#[test]
fn test_polygon_fill_and_edge() {
    let mut polygon = PolygonPlot::new(source(&[0.0, 1.0, 1.0]), source(&[0.0, 0.0, 1.0]), transform(false));
    let mut gc = RecordingContext::new();
    polygon.render(&mut gc).unwrap();
    assert!(polygon.screen_path().closed);
    assert_eq!(gc.fills().count(), 0);
    assert_eq!(gc.strokes().count(), 1);

    polygon.set_config(PolygonPlotConfig {
        face_color: Color::WHITE,
        ..PolygonPlotConfig::default()
    });
    gc.clear();
    polygon.render(&mut gc).unwrap();
    assert_eq!(gc.fills().count(), 1);
    assert_eq!(gc.strokes().count(), 1);
}

#[test]
fn test_polygon_needs_three_vertices() {
    let mut polygon = PolygonPlot::new(source(&[0.0, 1.0]), source(&[0.0, 1.0]), transform(false));
    let mut gc = RecordingContext::new();
    polygon.render(&mut gc).unwrap();
    assert!(gc.commands.is_empty());
}

#[test]
fn test_quiver_vectors_are_pixel_offsets() {
    let vectors = Arc::new(RwLock::new(MultiArrayDataSource::new(vec![[10.0, 0.0], [0.0, 10.0], [0.0, 0.0]])));
    let mut quiver = QuiverPlot::new(
        source(&[1.0, 2.0, 3.0]),
        source(&[1.0, 2.0, 3.0]),
        vectors,
        transform(true),
    );
    quiver.ensure_rendered().unwrap();
    let paths: &[Path] = quiver.screen_paths();
    // Two arrows (shaft + head each); the zero vector is skipped.
    assert_eq!(paths.len(), 4);
    assert_eq!(paths[0].points, points(&[(10.0, 90.0), (20.0, 90.0)]));
    // The value axis grows upward, so +v points toward smaller screen y.
    assert_eq!(paths[2].points, points(&[(20.0, 80.0), (20.0, 70.0)]));
    assert_eq!(paths[1].points[1], DVec2::new(20.0, 90.0));
}

#[test]
fn test_quiver_mismatched_vectors_draw_nothing() {
    let vectors = Arc::new(RwLock::new(MultiArrayDataSource::new(vec![[1.0, 1.0]])));
    let mut quiver = QuiverPlot::new(source(&[1.0, 2.0]), source(&[1.0, 2.0]), vectors, transform(false));
    quiver.ensure_rendered().unwrap();
    assert!(quiver.screen_paths().is_empty());
}

#[test]
fn test_renderer_reports_sources() {
    let index = source(&[0.0]);
    let value = source(&[0.0]);
    let line = LinePlot::new(index.clone(), value, transform(false));
    let sources = line.sources();
    assert_eq!(sources.len(), 2);
    assert!(Arc::ptr_eq(&sources[0], &index));
    assert_eq!(line.kind(), "line");
}
