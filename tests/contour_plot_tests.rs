use chaco_core::data_types::{arange, Levels, LineStyles, SharedGrid, SharedImage, SortOrder};
use chaco_core::mapper::{SharedGridMapper, SharedRange2D};
use chaco_core::plot_types::{ContourLinePlot, ContourPolyPlot, GridBase, StageCounts};
use chaco_core::rendering::DrawCommand;
use chaco_core::style::{LineDash, StyleValue};
use chaco_core::{
    shared_range, ColorMapper, DataRange1D, DataRange2D, DataSource, GridDataSource, GridMapper, ImageData,
    Palette, PlotRenderer, RecordingContext,
};
use parking_lot::RwLock;
use std::sync::Arc;

/// Grid over integer coordinates, 100 pixels per cell on both axes.
fn grid_base(width: usize, height: usize, f: impl Fn(f64, f64) -> f64) -> GridBase {
    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            values.push(f(x as f64, y as f64));
        }
    }
    let image: SharedImage = Arc::new(RwLock::new(ImageData::new(width, height, values).unwrap()));
    let grid: SharedGrid = Arc::new(RwLock::new(GridDataSource::new(
        arange(width),
        arange(height),
        (SortOrder::Ascending, SortOrder::Ascending),
    )));
    let range: SharedRange2D = Arc::new(RwLock::new(DataRange2D::new()));
    range.write().add(grid.clone());
    let mapper: SharedGridMapper = Arc::new(RwLock::new(GridMapper::new(range)));
    mapper.write().set_screen_bounds(
        (0.0, 100.0 * (width - 1) as f64),
        (0.0, 100.0 * (height - 1) as f64),
    );
    GridBase::new(image, grid, mapper)
}

fn cone() -> GridBase {
    grid_base(5, 5, |x, y| ((x - 2.0).powi(2) + (y - 2.0).powi(2)).sqrt())
}

fn ramp() -> GridBase {
    grid_base(5, 5, |x, _| x - 2.0)
}

fn ones() -> StageCounts {
    StageCounts {
        levels: 1,
        widths: 1,
        styles: 1,
        colors: 1,
        geometry: 1,
        screen: 1,
    }
}

#[test]
fn test_closed_contour_around_peak() {
    let mut plot = ContourLinePlot::new(cone());
    plot.set_levels(Levels::Explicit(vec![1.5]));
    plot.ensure_rendered().unwrap();

    assert_eq!(plot.levels(), &[1.5]);
    assert_eq!(plot.traces().len(), 1);
    assert_eq!(plot.traces()[0].len(), 1);
    assert!(plot.traces()[0][0].closed);

    let path = &plot.screen_traces()[0][0];
    assert!(path.closed);
    for p in &path.points {
        let d = (p.x - 200.0).hypot(p.y - 200.0);
        assert!(d > 100.0 && d < 200.0);
    }
}

#[test]
fn test_first_render_computes_every_stage_once() {
    let mut plot = ContourLinePlot::new(cone());
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.stage_counts(), ones());

    plot.ensure_rendered().unwrap();
    assert_eq!(plot.stage_counts(), ones());
}

#[test]
fn test_style_changes_leave_geometry_alone() {
    let mut plot = ContourLinePlot::new(cone());
    plot.ensure_rendered().unwrap();

    plot.set_widths(StyleValue::Cycle(vec![1.0, 3.0]));
    plot.ensure_rendered().unwrap();
    assert_eq!(
        plot.stage_counts(),
        StageCounts {
            widths: 2,
            ..ones()
        }
    );

    plot.set_styles(LineStyles::Uniform(LineDash::Dot));
    plot.ensure_rendered().unwrap();
    assert_eq!(
        plot.stage_counts(),
        StageCounts {
            widths: 2,
            styles: 2,
            ..ones()
        }
    );
    assert!(plot.styles().iter().all(|s| *s == LineDash::Dot));

    plot.set_colors(StyleValue::Single(chaco_core::Color::WHITE));
    plot.ensure_rendered().unwrap();
    assert_eq!(
        plot.stage_counts(),
        StageCounts {
            widths: 2,
            styles: 2,
            colors: 2,
            ..ones()
        }
    );
}

#[test]
fn test_level_change_recomputes_dependents() {
    let mut plot = ContourLinePlot::new(cone());
    plot.ensure_rendered().unwrap();
    plot.set_levels(Levels::Count(4));
    plot.ensure_rendered().unwrap();
    let counts = plot.stage_counts();
    assert_eq!(counts.levels, 2);
    assert_eq!(counts.widths, 2);
    assert_eq!(counts.styles, 2);
    assert_eq!(counts.colors, 2);
    assert_eq!(counts.geometry, 2);
    assert_eq!(counts.screen, 2);
    assert_eq!(plot.levels().len(), 4);
    assert_eq!(plot.widths().len(), 4);
}

#[test]
fn test_screen_change_only_remaps() {
    let base = cone();
    let mut plot = ContourLinePlot::new(base.clone());
    plot.set_levels(Levels::Explicit(vec![1.5]));
    plot.ensure_rendered().unwrap();
    let before = plot.screen_traces()[0][0].points[0];

    base.index_mapper.write().set_screen_bounds((0.0, 800.0), (0.0, 800.0));
    plot.ensure_rendered().unwrap();
    assert_eq!(
        plot.stage_counts(),
        StageCounts {
            screen: 2,
            ..ones()
        }
    );
    let after = plot.screen_traces()[0][0].points[0];
    assert!((after.x - before.x * 2.0).abs() < 1e-9);
}

#[test]
fn test_value_change_retraces() {
    let base = cone();
    let mut plot = ContourLinePlot::new(base.clone());
    plot.set_levels(Levels::Explicit(vec![1.5]));
    plot.ensure_rendered().unwrap();

    let flat = vec![0.0; 25];
    base.value.write().set_data(flat).unwrap();
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.stage_counts().geometry, 2);
    assert!(plot.traces()[0].is_empty());
}

#[test]
fn test_signed_styles_dash_negative_levels() {
    let mut plot = ContourLinePlot::new(ramp());
    plot.set_levels(Levels::Explicit(vec![0.5, -1.5]));
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.levels(), &[-1.5, 0.5]);
    assert_eq!(plot.styles(), &[LineDash::Dash, LineDash::Solid]);

    // Each level crosses the ramp once, top to bottom.
    for traces in plot.traces() {
        assert_eq!(traces.len(), 1);
        assert!(!traces[0].closed);
        assert_eq!(traces[0].points.len(), 5);
    }

    let mut gc = RecordingContext::new();
    plot.draw(&mut gc);
    assert_eq!(gc.strokes().count(), 2);
    assert!(gc.commands.contains(&DrawCommand::LineDash(LineDash::Dash.pattern().to_vec())));
}

#[test]
fn test_color_mapper_drives_line_colors() {
    let cmap = Arc::new(RwLock::new(ColorMapper::new(
        Palette::Gray,
        shared_range(DataRange1D::with_bounds(-2.0, 2.0)),
    )));
    let mut plot = ContourLinePlot::new(ramp()).with_color_mapper(cmap.clone());
    plot.set_levels(Levels::Explicit(vec![-1.5, 1.5]));
    plot.ensure_rendered().unwrap();
    let colors = plot.colors().to_vec();
    assert_eq!(colors.len(), 2);
    assert!(colors[0].r < colors[1].r);

    cmap.write().set_palette(Palette::Hot);
    plot.ensure_rendered().unwrap();
    let counts = plot.stage_counts();
    assert_eq!(counts.colors, 2);
    assert_eq!(counts.geometry, 1);
    assert_ne!(plot.colors(), colors.as_slice());
}

#[test]
fn test_contour_of_masked_cells_skips_them() {
    let base = cone();
    let mut mask = vec![true; 25];
    mask[12] = false;
    base.value.write().set_mask(mask).unwrap();
    let mut plot = ContourLinePlot::new(base);
    plot.set_levels(Levels::Explicit(vec![0.5]));
    plot.ensure_rendered().unwrap();
    // The only crossings of 0.5 touch the masked center node.
    assert!(plot.traces()[0].is_empty());
}

#[test]
fn test_filled_bands() {
    let cmap = Arc::new(RwLock::new(ColorMapper::new(
        Palette::Jet,
        shared_range(DataRange1D::with_bounds(0.0, 3.0)),
    )));
    let mut plot = ContourPolyPlot::new(cone()).with_color_mapper(cmap);
    plot.set_levels(Levels::Explicit(vec![0.0, 1.0, 2.0, 3.0]));
    let mut gc = RecordingContext::new();
    plot.render(&mut gc).unwrap();

    assert_eq!(plot.polygons().len(), 3);
    assert_eq!(plot.screen_polygons().len(), 3);
    assert_eq!(plot.colors().len(), 3);
    assert!(plot.polygons().iter().all(|band| !band.is_empty()));

    let expected: usize = plot
        .screen_polygons()
        .iter()
        .flatten()
        .filter(|p| p.points.len() >= 3)
        .count();
    assert_eq!(gc.fills().count(), expected);
    assert_eq!(gc.strokes().count(), 0);
}

#[test]
fn test_filled_band_colors_without_mapper() {
    let mut plot = ContourPolyPlot::new(cone());
    plot.set_levels(Levels::Explicit(vec![0.0, 1.0, 2.0]));
    plot.set_colors(StyleValue::Cycle(vec![chaco_core::Color::WHITE, chaco_core::Color::BLACK]));
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.colors(), &[chaco_core::Color::WHITE, chaco_core::Color::BLACK]);
    assert_eq!(plot.kind(), "contour_poly");
}
