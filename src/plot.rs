//! Plot Container
//!
//! `Plot` is the single owner of a set of named arrays, the data sources built
//! from them, the shared index/value ranges and the renderers drawn over them.
//! Renderers are grouped under plot names (`plot0`, `plot1`, ...) so that a
//! multi-series call can be removed again as a unit.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use glam::DVec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color_mapper::{ColorMapper, Palette, SharedColorMapper};
use crate::data_types::{
    arange, linspace, same_source, shared_range, shared_source, ArrayDataSource, ContourConfig, DataRange1D,
    DataRange2D, GridDataSource, ImageData, LinePlotConfig, PolygonPlotConfig, ScatterPlotConfig,
    SharedGrid, SharedImage, SharedRange, SharedSource, SortOrder,
};
use crate::error::{PlotError, PlotResult};
use crate::mapper::{GridMapper, ScaleKind, SharedGridMapper, SharedRange2D};
use crate::plot_types::{
    CMapImagePlot, ColormappedScatterPlot, ContourLinePlot, ContourPolyPlot, GridBase, ImagePlot, LinePlot,
    PolygonPlot, ScatterPlot, SharedRenderer,
};
use crate::rendering::GraphicsContext;
use crate::style::Color;
use crate::transform::{Orientation, PlotTransform};

/// One named array held by `ArrayPlotData`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotArray {
    D1(Vec<f64>),
    /// Row-major scalar grid.
    D2 {
        width: usize,
        height: usize,
        values: Vec<f64>,
    },
    /// Row-major RGB (depth 3) or RGBA (depth 4) pixels.
    D3 {
        width: usize,
        height: usize,
        depth: usize,
        values: Vec<f64>,
    },
}

impl PlotArray {
    /// Scalar grid from rows of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> PlotResult<Self> {
        let width = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(PlotError::Shape {
                expected: vec![rows.len(), width],
                actual: vec![rows.len(), bad.len()],
            });
        }
        Ok(PlotArray::D2 {
            width,
            height: rows.len(),
            values: rows.concat(),
        })
    }

    /// numpy-style shape: `[n]`, `[rows, cols]` or `[rows, cols, depth]`.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            PlotArray::D1(v) => vec![v.len()],
            PlotArray::D2 { width, height, .. } => vec![*height, *width],
            PlotArray::D3 {
                width, height, depth, ..
            } => vec![*height, *width, *depth],
        }
    }

    fn to_image(&self) -> PlotResult<ImageData> {
        match self {
            PlotArray::D1(v) => Err(PlotError::Config(format!(
                "expected 2D or 3D data, got a 1D array of {}",
                v.len()
            ))),
            PlotArray::D2 { width, height, values } => ImageData::new(*width, *height, values.clone()),
            PlotArray::D3 {
                width,
                height,
                depth,
                values,
            } => {
                if !matches!(depth, 3 | 4) {
                    return Err(PlotError::Config(format!(
                        "image plots require a color depth of 3 or 4, got {}",
                        depth
                    )));
                }
                ImageData::with_depth(*width, *height, *depth, values.clone())
            }
        }
    }
}

impl From<Vec<f64>> for PlotArray {
    fn from(values: Vec<f64>) -> Self {
        PlotArray::D1(values)
    }
}

/// Named arrays that drive a `Plot`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayPlotData {
    arrays: BTreeMap<String, PlotArray>,
}

impl ArrayPlotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, array: impl Into<PlotArray>) -> Self {
        self.set_data(name, array);
        self
    }

    /// Stores `array` under `name`, returning the array it replaced.
    pub fn set_data(&mut self, name: impl Into<String>, array: impl Into<PlotArray>) -> Option<PlotArray> {
        self.arrays.insert(name.into(), array.into())
    }

    pub fn get_data(&self, name: &str) -> Option<&PlotArray> {
        self.arrays.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PlotArray> {
        self.arrays.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// JSON export of every array. Non-finite values come out as `null`.
    pub fn to_json(&self) -> PlotResult<String> {
        serde_json::to_string(self).map_err(|e| PlotError::Runtime(format!("cannot export plot data: {}", e)))
    }

    pub fn from_json(json: &str) -> PlotResult<Self> {
        serde_json::from_str(json).map_err(|e| PlotError::Config(format!("bad plot data json: {}", e)))
    }
}

/// Renderer families created by `Plot::plot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    Scatter,
    Polygon,
    CmapScatter,
}

impl FromStr for PlotKind {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "line" => Ok(PlotKind::Line),
            "scatter" => Ok(PlotKind::Scatter),
            "polygon" => Ok(PlotKind::Polygon),
            "cmap_scatter" => Ok(PlotKind::CmapScatter),
            other => Err(PlotError::Config(format!("unknown plot type '{}'", other))),
        }
    }
}

/// Renderer families created by `Plot::contour_plot`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    Line,
    Poly,
}

impl FromStr for ContourKind {
    type Err = PlotError;

    fn from_str(s: &str) -> PlotResult<Self> {
        match s {
            "line" => Ok(ContourKind::Line),
            "poly" => Ok(ContourKind::Poly),
            other => Err(PlotError::Config(format!("unknown contour plot type '{}'", other))),
        }
    }
}

/// Series color request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SeriesColor {
    /// The renderer's own default.
    #[default]
    Default,
    /// Next entry of the plot's `auto_colors`.
    Auto,
    Fixed(Color),
}

#[derive(Clone, Debug, Default)]
pub struct PlotOptions {
    /// Generated as `plot{n}` when absent.
    pub name: Option<String>,
    pub index_scale: ScaleKind,
    pub value_scale: ScaleKind,
    pub color: SeriesColor,
    /// Palette for `cmap_scatter`; falls back to the plot's color mapper.
    pub colormap: Option<Palette>,
}

impl PlotOptions {
    /// Options with scales given by name (`"linear"`, `"log"`).
    pub fn scales(index_scale: &str, value_scale: &str) -> PlotResult<Self> {
        Ok(Self {
            index_scale: index_scale.parse()?,
            value_scale: value_scale.parse()?,
            ..Self::default()
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color(mut self, color: SeriesColor) -> Self {
        self.color = color;
        self
    }

    pub fn colormap(mut self, palette: Palette) -> Self {
        self.colormap = Some(palette);
        self
    }
}

/// Placement of an image or contour grid along one axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Bounds {
    /// Cell indices `0..n`.
    #[default]
    Auto,
    /// `n` values evenly spaced from low to high.
    Span(f64, f64),
    /// A 1D array as long as the axis, or a 2D array of the data's shape.
    Array(PlotArray),
    /// An array looked up in the plot data.
    Named(String),
}

#[derive(Clone, Debug, Default)]
pub struct GridPlotOptions {
    pub name: Option<String>,
    /// Palette for scalar images and filled contours.
    pub colormap: Option<Palette>,
    pub xbounds: Bounds,
    pub ybounds: Bounds,
    pub contour: ContourConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// A data source as cached by the plot, by array dimensionality.
#[derive(Clone)]
pub enum PlotSource {
    Array(SharedSource),
    Image(SharedImage),
}

enum Placement {
    Xy(PlotTransform),
    Grid(SharedGridMapper),
}

struct PlotEntry {
    renderer: SharedRenderer,
    /// Index and value sources registered with the 1D ranges.
    sources: Vec<SharedSource>,
    grid: Option<SharedGrid>,
    placement: Placement,
}

pub const DEFAULT_AUTO_COLORS: [&str; 5] = ["gold", "brown", "lightblue", "darkblue", "purple"];

pub struct Plot {
    data: ArrayPlotData,
    datasources: BTreeMap<String, PlotSource>,
    /// Plot groups in creation order, which is also the draw order.
    plots: Vec<(String, Vec<PlotEntry>)>,
    default_index: Option<SharedSource>,
    index_range: SharedRange,
    value_range: SharedRange,
    range2d: SharedRange2D,
    color_mapper: Option<SharedColorMapper>,
    orientation: Orientation,
    index_screen: (f64, f64),
    value_screen: (f64, f64),
    pub auto_colors: Vec<Color>,
    pub auto_color_idx: usize,
}

impl Default for Plot {
    fn default() -> Self {
        Self::new(ArrayPlotData::new())
    }
}

impl Plot {
    pub fn new(data: ArrayPlotData) -> Self {
        Self {
            data,
            datasources: BTreeMap::new(),
            plots: Vec::new(),
            default_index: None,
            index_range: shared_range(DataRange1D::new()),
            value_range: shared_range(DataRange1D::new()),
            range2d: Arc::new(RwLock::new(DataRange2D::new())),
            color_mapper: None,
            orientation: Orientation::H,
            index_screen: (0.0, 1.0),
            value_screen: (0.0, 1.0),
            auto_colors: DEFAULT_AUTO_COLORS.iter().filter_map(|c| Color::named(c)).collect(),
            auto_color_idx: 0,
        }
    }

    pub fn data(&self) -> &ArrayPlotData {
        &self.data
    }

    pub fn index_range(&self) -> &SharedRange {
        &self.index_range
    }

    pub fn value_range(&self) -> &SharedRange {
        &self.value_range
    }

    pub fn range2d(&self) -> &SharedRange2D {
        &self.range2d
    }

    pub fn color_mapper(&self) -> Option<&SharedColorMapper> {
        self.color_mapper.as_ref()
    }

    /// Color mapper used by later scalar image and colormapped scatter plots
    /// that do not name a palette.
    pub fn set_color_mapper(&mut self, mapper: Option<SharedColorMapper>) {
        self.color_mapper = mapper;
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Orientation of XY renderers created from now on.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn default_index(&self) -> Option<&SharedSource> {
        self.default_index.as_ref()
    }

    pub fn datasource(&self, name: &str) -> Option<&PlotSource> {
        self.datasources.get(name)
    }

    pub fn plot_names(&self) -> impl Iterator<Item = &str> {
        self.plots.iter().map(|(name, _)| name.as_str())
    }

    pub fn get_plot(&self, name: &str) -> Option<Vec<SharedRenderer>> {
        self.group(name)
            .map(|entries| entries.iter().map(|e| e.renderer.clone()).collect())
    }

    /// Screen intervals of the index and value axes, applied to every
    /// renderer's mappers. Image and contour grids take x from the index axis
    /// and y from the value axis.
    pub fn set_screen_bounds(&mut self, index: (f64, f64), value: (f64, f64)) {
        self.index_screen = index;
        self.value_screen = value;
        for (_, entries) in &self.plots {
            for entry in entries {
                self.place(&entry.placement);
            }
        }
    }

    pub fn screen_bounds(&self) -> ((f64, f64), (f64, f64)) {
        (self.index_screen, self.value_screen)
    }

    /// Plot-level linear transform over the shared ranges, for tools.
    pub fn transform(&self) -> PlotTransform {
        let transform = PlotTransform::new(
            ScaleKind::Linear.build(self.index_range.clone()),
            ScaleKind::Linear.build(self.value_range.clone()),
        )
        .with_orientation(self.orientation);
        self.place(&Placement::Xy(transform.clone()));
        transform
    }

    /// Maps (index, value) points through the plot-level transform.
    pub fn map_screen(&self, points: &[DVec2]) -> PlotResult<Vec<DVec2>> {
        let (index, value): (Vec<f64>, Vec<f64>) = points.iter().map(|p| (p.x, p.y)).unzip();
        self.transform().map_screen(&index, &value)
    }

    /// Adds renderers for the named arrays.
    ///
    /// With one name it is the value series over the default index (created
    /// as `0..len` if needed). With more names the first is the index and
    /// every following one a value series. `cmap_scatter` takes exactly
    /// (index, value, color).
    pub fn plot(&mut self, names: &[&str], kind: &str, options: PlotOptions) -> PlotResult<Vec<SharedRenderer>> {
        let kind: PlotKind = kind.parse()?;
        if names.is_empty() {
            return Ok(vec![]);
        }
        let name = options.name.clone().unwrap_or_else(|| self.new_plot_name());

        let entries = match kind {
            PlotKind::CmapScatter => vec![self.cmap_scatter(names, &options)?],
            _ => {
                let (index, values) = if names.len() == 1 {
                    (self.default_index_for(names[0])?, names)
                } else {
                    let index = self.array_source(names[0])?;
                    if self.default_index.is_none() {
                        self.default_index = Some(index.clone());
                    }
                    self.index_range.write().add(index.clone());
                    (index, &names[1..])
                };
                let mut entries = Vec::with_capacity(values.len());
                for value_name in values {
                    let value = self.array_source(value_name)?;
                    self.value_range.write().add(value.clone());
                    let color = self.series_color(options.color);
                    let transform = self.make_transform(&options);
                    let renderer: SharedRenderer = match kind {
                        PlotKind::Line => {
                            let mut config = LinePlotConfig::default();
                            config.color = color.unwrap_or(config.color);
                            Arc::new(RwLock::new(
                                LinePlot::new(index.clone(), value.clone(), transform.clone()).with_config(config),
                            ))
                        }
                        PlotKind::Scatter => {
                            let mut config = ScatterPlotConfig::default();
                            config.color = color.unwrap_or(config.color);
                            Arc::new(RwLock::new(
                                ScatterPlot::new(index.clone(), value.clone(), transform.clone()).with_config(config),
                            ))
                        }
                        _ => {
                            let mut config = PolygonPlotConfig::default();
                            config.edge_color = color.unwrap_or(config.edge_color);
                            Arc::new(RwLock::new(
                                PolygonPlot::new(index.clone(), value.clone(), transform.clone()).with_config(config),
                            ))
                        }
                    };
                    entries.push(PlotEntry {
                        renderer,
                        sources: vec![index.clone(), value],
                        grid: None,
                        placement: Placement::Xy(transform),
                    });
                }
                entries
            }
        };
        debug!(plot = %name, renderers = entries.len(), "added plot");
        Ok(self.insert_group(name, entries))
    }

    /// Adds an image renderer. RGB/RGBA data is drawn as is; scalar data needs
    /// a palette (or a plot color mapper) and is drawn colormapped.
    pub fn img_plot(&mut self, data: &str, options: GridPlotOptions) -> PlotResult<Vec<SharedRenderer>> {
        let name = options.name.clone().unwrap_or_else(|| self.new_plot_name());
        let image = self.image_source(data)?;
        let depth = image.read().value_depth();

        let color_mapper = if depth == 1 {
            Some(self.resolve_colormap(&image, options.colormap)?)
        } else {
            None
        };
        let (grid, mapper) = self.make_grid(&image, &options)?;
        let base = GridBase::new(image, grid.clone(), mapper.clone());
        let renderer: SharedRenderer = match color_mapper {
            Some(cmap) => {
                self.color_mapper = Some(cmap.clone());
                Arc::new(RwLock::new(CMapImagePlot::new(base, cmap)))
            }
            None => Arc::new(RwLock::new(ImagePlot::new(base))),
        };
        debug!(plot = %name, depth, "added image plot");
        Ok(self.insert_group(name, vec![grid_entry(renderer, grid, mapper)]))
    }

    /// Adds a `"line"` or `"poly"` contour renderer over a scalar grid.
    pub fn contour_plot(&mut self, data: &str, kind: &str, options: GridPlotOptions) -> PlotResult<Vec<SharedRenderer>> {
        let kind: ContourKind = kind.parse()?;
        let name = options.name.clone().unwrap_or_else(|| self.new_plot_name());
        let image = self.image_source(data)?;
        if image.read().value_depth() != 1 {
            return Err(PlotError::Config("contour plots require a 2D scalar field".into()));
        }
        let poly_cmap = match kind {
            ContourKind::Poly => {
                let palette = options
                    .colormap
                    .ok_or_else(|| PlotError::Config("filled contours require a colormap".into()))?;
                Some(value_colormap(&image, palette))
            }
            ContourKind::Line => options.colormap.map(|palette| value_colormap(&image, palette)),
        };
        let (grid, mapper) = self.make_grid(&image, &options)?;
        let base = GridBase::new(image, grid.clone(), mapper.clone());
        let config = options.contour.clone();
        let renderer: SharedRenderer = match (kind, poly_cmap) {
            (ContourKind::Poly, Some(cmap)) => Arc::new(RwLock::new(
                ContourPolyPlot::new(base).with_config(config).with_color_mapper(cmap),
            )),
            (_, cmap) => {
                let mut plot = ContourLinePlot::new(base).with_config(config);
                if let Some(cmap) = cmap {
                    plot = plot.with_color_mapper(cmap);
                }
                Arc::new(RwLock::new(plot))
            }
        };
        debug!(plot = %name, ?kind, "added contour plot");
        Ok(self.insert_group(name, vec![grid_entry(renderer, grid, mapper)]))
    }

    /// Removes the named plots and deregisters the sources that no remaining
    /// renderer uses.
    pub fn delplot(&mut self, names: &[&str]) -> PlotResult<()> {
        if let Some(missing) = names.iter().find(|n| self.group(n).is_none()) {
            return Err(PlotError::MissingData(missing.to_string()));
        }
        let mut removed = Vec::new();
        self.plots.retain_mut(|(name, entries)| {
            if names.contains(&name.as_str()) {
                removed.append(entries);
                false
            } else {
                true
            }
        });

        let in_use = |source: &SharedSource, plots: &[(String, Vec<PlotEntry>)]| {
            plots
                .iter()
                .flat_map(|(_, entries)| entries)
                .any(|e| e.sources.iter().any(|s| same_source(s, source)))
        };
        for entry in &removed {
            for source in &entry.sources {
                if !in_use(source, &self.plots) {
                    self.index_range.write().remove(source);
                    self.value_range.write().remove(source);
                }
            }
            if let Some(grid) = &entry.grid {
                self.range2d.write().remove(grid);
            }
        }
        if let Some(index) = &self.default_index {
            if !in_use(index, &self.plots) {
                self.default_index = None;
            }
        }
        debug!(removed = removed.len(), "deleted plots");
        Ok(())
    }

    /// Replaces a named array and pushes it into the cached data source.
    pub fn set_data(&mut self, name: &str, array: impl Into<PlotArray>) -> PlotResult<()> {
        let array = array.into();
        match (self.datasources.get(name), &array) {
            (Some(PlotSource::Array(source)), PlotArray::D1(values)) => {
                source.write().set_data(values.clone())?;
            }
            (Some(PlotSource::Image(image)), PlotArray::D2 { width, height, values })
            | (Some(PlotSource::Image(image)), PlotArray::D3 { width, height, values, .. }) => {
                let depth = image.read().value_depth();
                if array.shape().get(2).copied().unwrap_or(1) != depth {
                    return Err(PlotError::Config(format!(
                        "'{}' keeps its value depth of {}",
                        name, depth
                    )));
                }
                image.write().set_image(*width, *height, values.clone())?;
            }
            (Some(_), _) => {
                return Err(PlotError::Config(format!(
                    "'{}' cannot change between 1D and 2D data",
                    name
                )));
            }
            (None, _) => {}
        }
        self.data.set_data(name, array);
        Ok(())
    }

    /// Brings every renderer up to date and draws them in creation order.
    pub fn draw(&self, gc: &mut dyn GraphicsContext) -> PlotResult<()> {
        for (_, entries) in &self.plots {
            for entry in entries {
                entry.renderer.write().render(gc)?;
            }
        }
        Ok(())
    }

    fn group(&self, name: &str) -> Option<&Vec<PlotEntry>> {
        self.plots.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    fn insert_group(&mut self, name: String, entries: Vec<PlotEntry>) -> Vec<SharedRenderer> {
        let renderers = entries.iter().map(|e| e.renderer.clone()).collect();
        if let Some(slot) = self.plots.iter_mut().find(|(n, _)| *n == name) {
            warn!(plot = %name, "replacing existing plot");
            slot.1 = entries;
        } else {
            self.plots.push((name, entries));
        }
        renderers
    }

    fn new_plot_name(&self) -> String {
        let mut n = self.plots.len();
        loop {
            let name = format!("plot{}", n);
            if self.group(&name).is_none() {
                return name;
            }
            n += 1;
        }
    }

    fn place(&self, placement: &Placement) {
        match placement {
            Placement::Xy(transform) => {
                let (i0, i1) = self.index_screen;
                let (v0, v1) = self.value_screen;
                transform.index_mapper.write().set_screen_bounds(i0, i1);
                transform.value_mapper.write().set_screen_bounds(v0, v1);
            }
            Placement::Grid(mapper) => {
                mapper.write().set_screen_bounds(self.index_screen, self.value_screen);
            }
        }
    }

    fn make_transform(&self, options: &PlotOptions) -> PlotTransform {
        let transform = PlotTransform::new(
            options.index_scale.build(self.index_range.clone()),
            options.value_scale.build(self.value_range.clone()),
        )
        .with_orientation(self.orientation);
        self.place(&Placement::Xy(transform.clone()));
        transform
    }

    fn series_color(&mut self, request: SeriesColor) -> Option<Color> {
        match request {
            SeriesColor::Default => None,
            SeriesColor::Fixed(c) => Some(c),
            SeriesColor::Auto if self.auto_colors.is_empty() => None,
            SeriesColor::Auto => {
                self.auto_color_idx = (self.auto_color_idx + 1) % self.auto_colors.len();
                Some(self.auto_colors[self.auto_color_idx])
            }
        }
    }

    fn default_index_for(&mut self, value_name: &str) -> PlotResult<SharedSource> {
        if let Some(index) = &self.default_index {
            return Ok(index.clone());
        }
        let len = self.array_source(value_name)?.read().get_size();
        let index = shared_source(ArrayDataSource::with_sort_order(arange(len), SortOrder::None));
        self.index_range.write().add(index.clone());
        self.default_index = Some(index.clone());
        Ok(index)
    }

    fn cmap_scatter(&mut self, names: &[&str], options: &PlotOptions) -> PlotResult<PlotEntry> {
        let [index_name, value_name, color_name] = names else {
            return Err(PlotError::Config(
                "colormapped scatter plots require (index, value, color) data".into(),
            ));
        };
        let index = self.array_source(index_name)?;
        let value = self.array_source(value_name)?;
        let color = self.array_source(color_name)?;
        let cmap = match options.colormap {
            Some(palette) => Arc::new(RwLock::new(ColorMapper::new(
                palette,
                shared_range(DataRange1D::from_sources([color.clone()])),
            ))),
            None => self
                .color_mapper
                .clone()
                .ok_or_else(|| PlotError::Config("colormapped scatter plots require a colormap".into()))?,
        };
        if self.default_index.is_none() {
            self.default_index = Some(index.clone());
        }
        self.index_range.write().add(index.clone());
        self.value_range.write().add(value.clone());
        self.color_mapper = Some(cmap.clone());

        let transform = self.make_transform(options);
        let renderer: SharedRenderer = Arc::new(RwLock::new(ColormappedScatterPlot::new(
            index.clone(),
            value.clone(),
            color,
            cmap,
            transform.clone(),
        )));
        Ok(PlotEntry {
            renderer,
            sources: vec![index, value],
            grid: None,
            placement: Placement::Xy(transform),
        })
    }

    fn resolve_colormap(&self, image: &SharedImage, palette: Option<Palette>) -> PlotResult<SharedColorMapper> {
        match palette {
            Some(palette) => Ok(value_colormap(image, palette)),
            None => self
                .color_mapper
                .clone()
                .ok_or_else(|| PlotError::Config("scalar 2D data requires a colormap".into())),
        }
    }

    fn make_grid(&self, image: &SharedImage, options: &GridPlotOptions) -> PlotResult<(SharedGrid, SharedGridMapper)> {
        let (height, width) = image.read().shape();
        let xs = self.resolve_bounds(&options.xbounds, (height, width), Axis::X)?;
        let ys = self.resolve_bounds(&options.ybounds, (height, width), Axis::Y)?;
        let grid: SharedGrid = Arc::new(RwLock::new(GridDataSource::new(
            xs,
            ys,
            (SortOrder::Ascending, SortOrder::Ascending),
        )));
        self.range2d.write().add(grid.clone());
        let mapper: SharedGridMapper = Arc::new(RwLock::new(GridMapper::new(self.range2d.clone())));
        self.place(&Placement::Grid(mapper.clone()));
        Ok((grid, mapper))
    }

    fn resolve_bounds(&self, bounds: &Bounds, shape: (usize, usize), axis: Axis) -> PlotResult<Vec<f64>> {
        let (height, width) = shape;
        let n = match axis {
            Axis::X => width,
            Axis::Y => height,
        };
        let label = match axis {
            Axis::X => "xbounds",
            Axis::Y => "ybounds",
        };
        match bounds {
            Bounds::Auto => Ok(arange(n)),
            Bounds::Span(low, high) => Ok(linspace(*low, *high, n)),
            Bounds::Named(name) => {
                let array = self
                    .data
                    .get_data(name)
                    .ok_or_else(|| PlotError::MissingData(name.clone()))?;
                self.resolve_bounds(&Bounds::Array(array.clone()), shape, axis)
            }
            Bounds::Array(PlotArray::D1(values)) if values.len() == n => match (values.first(), values.last()) {
                (Some(first), Some(last)) => Ok(linspace(*first, *last, n)),
                _ => Ok(vec![]),
            },
            Bounds::Array(PlotArray::D2 {
                width: w,
                height: h,
                values,
            }) if (*h, *w) == shape && values.len() == w * h => {
                let edge = match axis {
                    Axis::X => values.first().zip(values.get(width.saturating_sub(1))),
                    Axis::Y => values.first().zip(values.get(width * height.saturating_sub(1))),
                };
                Ok(edge.map_or_else(Vec::new, |(first, last)| linspace(*first, *last, n)))
            }
            Bounds::Array(other) => Err(PlotError::Config(format!(
                "{} shape {:?} not commensurate with data shape {:?}",
                label,
                other.shape(),
                [height, width]
            ))),
        }
    }

    fn lookup(&self, name: &str) -> PlotResult<&PlotArray> {
        self.data
            .get_data(name)
            .ok_or_else(|| PlotError::MissingData(name.to_string()))
    }

    fn array_source(&mut self, name: &str) -> PlotResult<SharedSource> {
        match self.datasources.get(name) {
            Some(PlotSource::Array(source)) => return Ok(source.clone()),
            Some(PlotSource::Image(_)) => {
                return Err(PlotError::Config(format!("'{}' is 2D data, expected a 1D array", name)));
            }
            None => {}
        }
        let source = match self.lookup(name)? {
            PlotArray::D1(values) => shared_source(ArrayDataSource::with_sort_order(values.clone(), SortOrder::None)),
            other => {
                return Err(PlotError::Config(format!(
                    "'{}' has shape {:?}, expected a 1D array",
                    name,
                    other.shape()
                )));
            }
        };
        self.datasources.insert(name.to_string(), PlotSource::Array(source.clone()));
        Ok(source)
    }

    fn image_source(&mut self, name: &str) -> PlotResult<SharedImage> {
        match self.datasources.get(name) {
            Some(PlotSource::Image(image)) => return Ok(image.clone()),
            Some(PlotSource::Array(_)) => {
                return Err(PlotError::Config(format!("'{}' is a 1D array, expected 2D data", name)));
            }
            None => {}
        }
        let image: SharedImage = Arc::new(RwLock::new(self.lookup(name)?.to_image()?));
        self.datasources.insert(name.to_string(), PlotSource::Image(image.clone()));
        Ok(image)
    }
}

fn grid_entry(renderer: SharedRenderer, grid: SharedGrid, mapper: SharedGridMapper) -> PlotEntry {
    let sources = {
        let g = grid.read();
        vec![g.xdata().clone(), g.ydata().clone()]
    };
    PlotEntry {
        renderer,
        sources,
        grid: Some(grid),
        placement: Placement::Grid(mapper),
    }
}

/// Color mapper over the value range of a scalar image.
fn value_colormap(image: &SharedImage, palette: Palette) -> SharedColorMapper {
    let source: SharedSource = image.clone();
    Arc::new(RwLock::new(ColorMapper::new(
        palette,
        shared_range(DataRange1D::from_sources([source])),
    )))
}
