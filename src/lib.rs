//! chaco_core: data ranges, mappers and cached renderers for 2D plotting

pub mod color_mapper;
pub mod contour;
pub mod data_types;
pub mod error;
pub mod mapper;
pub mod plot;
pub mod plot_types;
pub mod render_cache;
pub mod rendering;
pub mod style;
pub mod tools;
pub mod transform;
pub mod view_controller;

pub use color_mapper::{ColorMapper, Palette, SharedColorMapper};
pub use data_types::{
    shared_range, shared_source, ArrayDataSource, DataRange1D, DataRange2D, DataSource, FunctionDataSource,
    GridDataSource, ImageData, MultiArrayDataSource, SharedRange, SharedSource,
};
pub use error::{PlotError, PlotResult};
pub use mapper::{GridMapper, LinearMapper, LogMapper, Mapper, PolarMapper, ScaleKind, SharedMapper};
pub use plot::{ArrayPlotData, Plot, PlotArray};
pub use plot_types::{PlotRenderer, SharedRenderer};
pub use rendering::{GraphicsContext, RecordingContext};
pub use style::Color;
pub use transform::PlotTransform;
