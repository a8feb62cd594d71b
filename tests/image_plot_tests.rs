use chaco_core::data_types::{arange, ImagePlotConfig, SharedGrid, SharedImage, SortOrder};
use chaco_core::mapper::{SharedGridMapper, SharedRange2D};
use chaco_core::plot_types::{CMapImagePlot, GridBase, ImagePlot, InspectImage};
use chaco_core::tools::{ImageInspectorTool, PointerEvent, Tool, ToolResponse};
use chaco_core::{
    shared_range, Color, ColorMapper, DataRange1D, DataRange2D, GridDataSource, GridMapper, ImageData, Palette,
    PlotRenderer, RecordingContext, SharedColorMapper,
};
use glam::DVec2;
use parking_lot::RwLock;
use std::sync::Arc;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Places `image` on cell-edge coordinates, 100 pixels per cell.
fn grid_base(image: ImageData, y_screen: (f64, f64)) -> GridBase {
    let (rows, cols) = image.shape();
    let image: SharedImage = Arc::new(RwLock::new(image));
    let grid: SharedGrid = Arc::new(RwLock::new(GridDataSource::new(
        arange(cols + 1),
        arange(rows + 1),
        (SortOrder::Ascending, SortOrder::Ascending),
    )));
    let range: SharedRange2D = Arc::new(RwLock::new(DataRange2D::new()));
    range.write().add(grid.clone());
    let mapper: SharedGridMapper = Arc::new(RwLock::new(GridMapper::new(range)));
    mapper.write().set_screen_bounds((0.0, 100.0 * cols as f64), y_screen);
    GridBase::new(image, grid, mapper)
}

/// 3 × 2 ramp from 0 to 5, row 0 first.
fn ramp_image() -> ImageData {
    ImageData::from_rows(&[vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap()
}

fn gray() -> SharedColorMapper {
    Arc::new(RwLock::new(ColorMapper::new(
        Palette::Gray,
        shared_range(DataRange1D::with_bounds(0.0, 5.0)),
    )))
}

#[test]
fn test_cmap_image_maps_values() {
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (0.0, 200.0)), gray());
    plot.ensure_rendered().unwrap();

    let mapped = plot.mapped_image();
    assert!(!mapped.flipped);
    assert_eq!(mapped.buffer.width(), 3);
    assert_eq!(mapped.buffer.height(), 2);
    assert_eq!(mapped.color_at(0, 0), Some(BLACK));
    assert_eq!(mapped.color_at(2, 1), Some(WHITE));
    assert_eq!(mapped.buffer.get(0, 0), Some(BLACK));
    assert_eq!(plot.map_color(5.0), Color::WHITE);
    assert_eq!(plot.kind(), "cmap_img");

    let rect = plot.screen_rect().unwrap();
    assert_eq!(rect.size, DVec2::new(300.0, 200.0));

    let mut gc = RecordingContext::new();
    plot.draw(&mut gc);
    assert_eq!(gc.images(), 1);
}

#[test]
fn test_reversed_y_screen_flips_rows() {
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (200.0, 0.0)), gray());
    plot.ensure_rendered().unwrap();
    let mapped = plot.mapped_image();
    assert!(mapped.flipped);
    // Data row 0 sits in the bottom buffer row.
    assert_eq!(mapped.buffer.get(0, 1), Some(BLACK));
    assert_eq!(mapped.buffer.get(2, 0), Some(WHITE));
    assert_eq!(mapped.color_at(0, 0), Some(BLACK));
    assert_eq!(mapped.color_at(2, 1), Some(WHITE));
}

#[test]
fn test_selection_fades_only_deselected_pixels() {
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (0.0, 200.0)), gray());
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.mapped_image_recomputes(), 1);

    plot.set_value_selection(Some((0.0, 1.0)));
    assert!(!plot.is_mapped_image_valid());
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.mapped_image_recomputes(), 2);

    let mapped = plot.mapped_image();
    assert_eq!(mapped.color_at(0, 0), Some(BLACK));
    let faded = mapped.color_at(2, 1).unwrap();
    assert!(faded[0] > 50 && faded[0] < 100);
    assert_eq!(faded[3], 255);

    // Same selection again is a no-op.
    plot.set_value_selection(Some((0.0, 1.0)));
    assert!(plot.is_mapped_image_valid());
}

#[test]
fn test_alpha_change_keeps_mapped_image() {
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (0.0, 200.0)), gray());
    plot.ensure_rendered().unwrap();
    plot.set_config(ImagePlotConfig {
        alpha: 0.5,
        ..ImagePlotConfig::default()
    });
    assert!(plot.is_mapped_image_valid());

    plot.set_config(ImagePlotConfig {
        fade_alpha: 0.8,
        ..ImagePlotConfig::default()
    });
    assert!(!plot.is_mapped_image_valid());
}

#[test]
fn test_palette_change_remaps() {
    let cmap = gray();
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (0.0, 200.0)), cmap.clone());
    plot.ensure_rendered().unwrap();
    cmap.write().set_palette(Palette::Hot);
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.mapped_image_recomputes(), 2);
}

#[test]
fn test_masked_pixels_are_faded() {
    let mut image = ramp_image();
    chaco_core::DataSource::set_mask(&mut image, vec![true, true, true, true, true, false]).unwrap();
    let mut plot = CMapImagePlot::new(grid_base(image, (0.0, 200.0)), gray());
    plot.ensure_rendered().unwrap();
    assert_ne!(plot.mapped_image().color_at(2, 1), Some(WHITE));
}

#[test]
fn test_inspector_reports_pixel_under_pointer() {
    let mut plot = CMapImagePlot::new(grid_base(ramp_image(), (0.0, 200.0)), gray());
    plot.ensure_rendered().unwrap();
    let plot = Arc::new(RwLock::new(plot));
    let mut tool = ImageInspectorTool::new(plot.clone());

    let response = tool.dispatch(&PointerEvent::moved(150.0, 50.0)).unwrap();
    assert_eq!(response, ToolResponse::Redraw);
    let report = tool.report().unwrap();
    assert_eq!((report.x_index, report.y_index), (1, 0));
    assert_eq!(report.data_value, Some(1.0));

    assert_eq!(tool.dispatch(&PointerEvent::moved(160.0, 60.0)).unwrap(), ToolResponse::Handled);

    assert_eq!(tool.dispatch(&PointerEvent::Leave).unwrap(), ToolResponse::Redraw);
    assert!(tool.report().is_none());

    assert!(plot.read().inspect(DVec2::new(-10.0, 50.0)).is_none());
}

#[test]
fn test_rgb_image_pixels() {
    let image = ImageData::with_depth(2, 1, 3, vec![255.0, 0.0, 0.0, 0.0, 0.0, 255.0]).unwrap();
    let mut plot = ImagePlot::new(grid_base(image, (0.0, 100.0)));
    plot.ensure_rendered().unwrap();
    assert_eq!(plot.kind(), "img");
    assert_eq!(plot.mapped_image().color_at(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(plot.mapped_image().color_at(1, 0), Some([0, 0, 255, 255]));

    let report = plot.inspect(DVec2::new(150.0, 50.0)).unwrap();
    assert_eq!(report.x_index, 1);
    assert_eq!(report.data_value, None);
    assert_eq!(report.color, [0, 0, 255, 255]);
}
