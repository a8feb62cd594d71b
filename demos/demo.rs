//! Builds a plot with a line series, a colormapped image and contour lines
//! over it, renders into a recording context and prints what was drawn.

use chaco_core::data_types::{linspace, Levels};
use chaco_core::plot::{Bounds, GridPlotOptions, PlotOptions, SeriesColor};
use chaco_core::rendering::DrawCommand;
use chaco_core::tools::{MouseButton, PointerEvent, SelectingZoom, SelectingZoomConfig, Tool};
use chaco_core::{ArrayPlotData, Palette, Plot, PlotArray, RecordingContext};
use eyre::Result;
use tracing::info;

const N: usize = 64;

fn field() -> Result<PlotArray> {
    let xs = linspace(-3.0, 3.0, N);
    let rows: Vec<Vec<f64>> = xs
        .iter()
        .map(|&y| xs.iter().map(|&x| (x * x + y * y).sqrt().sin() / (1.0 + x * x + y * y)).collect())
        .collect();
    Ok(PlotArray::from_rows(&rows)?)
}

fn main() -> Result<()> {
    let x = linspace(-3.0, 3.0, 200);
    let y: Vec<f64> = x.iter().map(|v| (v * 2.0).sin() * (-v * v / 4.0).exp()).collect();
    let data = ArrayPlotData::new()
        .with("x", x)
        .with("y", y)
        .with("z", field()?);

    let mut plot = Plot::new(data);
    plot.set_screen_bounds((0.0, 800.0), (600.0, 0.0));

    let grid = GridPlotOptions {
        colormap: Some(Palette::Viridis),
        xbounds: Bounds::Span(-3.0, 3.0),
        ybounds: Bounds::Span(-3.0, 3.0),
        ..GridPlotOptions::default()
    };
    plot.img_plot("z", GridPlotOptions {
        name: Some("image".into()),
        ..grid.clone()
    })?;
    let mut contour = grid.clone();
    contour.name = Some("contours".into());
    contour.colormap = None;
    contour.contour.levels = Levels::Count(8);
    plot.contour_plot("z", "line", contour)?;
    plot.plot(&["x", "y"], "line", PlotOptions::default().named("series").color(SeriesColor::Auto))?;

    let mut gc = RecordingContext::new();
    plot.draw(&mut gc)?;
    info!(commands = gc.commands.len(), "first render");
    println!(
        "plots: {:?}",
        plot.plot_names().collect::<Vec<_>>()
    );
    println!(
        "strokes: {}, images: {}, dashed: {}",
        gc.strokes().count(),
        gc.images(),
        gc.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::LineDash(p) if !p.is_empty()))
            .count()
    );

    // Zoom into the upper right quarter and redraw.
    let mut zoom = SelectingZoom::new(plot.transform()).with_config(SelectingZoomConfig {
        always_on: true,
        ..SelectingZoomConfig::default()
    });
    zoom.dispatch(&PointerEvent::down(400.0, 300.0, MouseButton::Left))?;
    zoom.dispatch(&PointerEvent::moved(800.0, 0.0))?;
    zoom.dispatch(&PointerEvent::up(800.0, 0.0, MouseButton::Left))?;
    println!(
        "zoomed to index {:?}, value {:?}",
        plot.index_range().read().bounds(),
        plot.value_range().read().bounds()
    );

    gc.clear();
    plot.draw(&mut gc)?;
    println!("after zoom: {} strokes", gc.strokes().count());

    zoom.undo();
    println!("restored index {:?}", plot.index_range().read().bounds());
    Ok(())
}
