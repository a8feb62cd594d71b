use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::warn;

use super::data::{finite_min_max, SortOrder, ValueDimension};
use super::range::SharedRange;
use crate::error::{PlotError, PlotResult};

/// Shared handle to any data source. Several ranges and renderers may hold the same source.
pub type SharedSource = Arc<RwLock<dyn DataSource>>;

/// Wraps a concrete source into a shared handle.
pub fn shared_source<S: DataSource + 'static>(source: S) -> SharedSource {
    Arc::new(RwLock::new(source))
}

/// Identity comparison of two shared handles, ignoring vtable differences.
pub fn same_source(a: &SharedSource, b: &SharedSource) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Trait for data sources that supply values to ranges and renderers.
pub trait DataSource: Send + Sync {
    fn value_dimension(&self) -> ValueDimension {
        ValueDimension::Scalar
    }

    fn sort_order(&self) -> SortOrder;

    /// The (flattened) values of the source.
    fn get_data(&self) -> Vec<f64>;

    /// Values and a same-length mask; `true` marks a usable element.
    fn get_data_mask(&self) -> PlotResult<(Vec<f64>, Vec<bool>)>;

    /// Replace all data.
    fn set_data(&mut self, data: Vec<f64>) -> PlotResult<()>;

    fn set_mask(&mut self, mask: Vec<bool>) -> PlotResult<()>;

    fn remove_mask(&mut self) -> PlotResult<()>;

    fn is_masked(&self) -> bool;

    /// Number of values.
    fn get_size(&self) -> usize;

    /// (min, max) over the usable finite values, `None` when there are none.
    fn get_bounds(&self) -> Option<(f64, f64)>;

    /// Increases every time the data or mask changes.
    fn revision(&self) -> u64;
}

/// 1D array of values with optional mask.
#[derive(Clone, Debug, Default)]
pub struct ArrayDataSource {
    data: Vec<f64>,
    mask: Option<Vec<bool>>,
    sort_order: SortOrder,
    revision: u64,
}

impl ArrayDataSource {
    pub fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn with_sort_order(data: Vec<f64>, sort_order: SortOrder) -> Self {
        Self {
            data,
            sort_order,
            ..Default::default()
        }
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
        self.revision += 1;
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

impl DataSource for ArrayDataSource {
    fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    fn get_data(&self) -> Vec<f64> {
        self.data.clone()
    }

    fn get_data_mask(&self) -> PlotResult<(Vec<f64>, Vec<bool>)> {
        let mask = self
            .mask
            .clone()
            .unwrap_or_else(|| vec![true; self.data.len()]);
        Ok((self.data.clone(), mask))
    }

    fn set_data(&mut self, data: Vec<f64>) -> PlotResult<()> {
        if self.mask.as_ref().is_some_and(|m| m.len() != data.len()) {
            // A stale mask can never describe the new data.
            self.mask = None;
        }
        self.data = data;
        self.revision += 1;
        Ok(())
    }

    fn set_mask(&mut self, mask: Vec<bool>) -> PlotResult<()> {
        if mask.len() != self.data.len() {
            return Err(PlotError::Shape {
                expected: vec![self.data.len()],
                actual: vec![mask.len()],
            });
        }
        self.mask = Some(mask);
        self.revision += 1;
        Ok(())
    }

    fn remove_mask(&mut self) -> PlotResult<()> {
        self.mask = None;
        self.revision += 1;
        Ok(())
    }

    fn is_masked(&self) -> bool {
        self.mask.is_some()
    }

    fn get_size(&self) -> usize {
        self.data.len()
    }

    fn get_bounds(&self) -> Option<(f64, f64)> {
        if self.mask.is_none() {
            let (first, last) = (*self.data.first()?, *self.data.last()?);
            if first.is_finite() && last.is_finite() {
                match self.sort_order {
                    SortOrder::Ascending => return Some((first, last)),
                    SortOrder::Descending => return Some((last, first)),
                    SortOrder::None => {}
                }
            }
        }
        finite_min_max(&self.data, self.mask.as_deref())
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// N×2 array of vectors, used by quiver plots. As a `DataSource` it exposes
/// the vector magnitudes.
#[derive(Clone, Debug, Default)]
pub struct MultiArrayDataSource {
    vectors: Vec<[f64; 2]>,
    revision: u64,
}

impl MultiArrayDataSource {
    pub fn new(vectors: Vec<[f64; 2]>) -> Self {
        Self { vectors, revision: 0 }
    }

    pub fn vectors(&self) -> &[[f64; 2]] {
        &self.vectors
    }

    pub fn set_vectors(&mut self, vectors: Vec<[f64; 2]>) {
        self.vectors = vectors;
        self.revision += 1;
    }

    fn magnitudes(&self) -> Vec<f64> {
        self.vectors.iter().map(|[u, v]| u.hypot(*v)).collect()
    }
}

impl DataSource for MultiArrayDataSource {
    fn sort_order(&self) -> SortOrder {
        SortOrder::None
    }

    fn get_data(&self) -> Vec<f64> {
        self.magnitudes()
    }

    fn get_data_mask(&self) -> PlotResult<(Vec<f64>, Vec<bool>)> {
        Ok((self.magnitudes(), vec![true; self.vectors.len()]))
    }

    fn set_data(&mut self, data: Vec<f64>) -> PlotResult<()> {
        if data.len() % 2 != 0 {
            return Err(PlotError::Shape {
                expected: vec![data.len() / 2, 2],
                actual: vec![data.len()],
            });
        }
        self.set_vectors(data.chunks_exact(2).map(|c| [c[0], c[1]]).collect());
        Ok(())
    }

    fn set_mask(&mut self, _mask: Vec<bool>) -> PlotResult<()> {
        Err(PlotError::NotImplemented("MultiArrayDataSource does not support masks".into()))
    }

    fn remove_mask(&mut self) -> PlotResult<()> {
        Err(PlotError::NotImplemented("MultiArrayDataSource does not support masks".into()))
    }

    fn is_masked(&self) -> bool {
        false
    }

    fn get_size(&self) -> usize {
        self.vectors.len()
    }

    fn get_bounds(&self) -> Option<(f64, f64)> {
        finite_min_max(&self.magnitudes(), None)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

/// Generator signature for function-backed sources: `(low, high) -> values`.
pub type DataFunction = Arc<dyn Fn(f64, f64) -> Vec<f64> + Send + Sync>;

#[derive(Default)]
struct FunctionCache {
    data: Vec<f64>,
    range_revision: Option<u64>,
    revision: u64,
}

/// A source whose values are generated from the bounds of a driving range.
///
/// The data is derived, so direct replacement and masking are rejected. The
/// driving range must not itself contain this source.
pub struct FunctionDataSource {
    func: Option<DataFunction>,
    data_range: Option<SharedRange>,
    sort_order: SortOrder,
    cache: Mutex<FunctionCache>,
}

impl Default for FunctionDataSource {
    fn default() -> Self {
        Self {
            func: None,
            data_range: None,
            sort_order: SortOrder::Ascending,
            cache: Mutex::new(FunctionCache::default()),
        }
    }
}

impl FunctionDataSource {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(f64, f64) -> Vec<f64> + Send + Sync + 'static,
    {
        Self {
            func: Some(Arc::new(func)),
            ..Default::default()
        }
    }

    pub fn func(&self) -> Option<&DataFunction> {
        self.func.as_ref()
    }

    pub fn set_func(&mut self, func: DataFunction) {
        self.func = Some(func);
        self.invalidate();
    }

    pub fn data_range(&self) -> Option<&SharedRange> {
        self.data_range.as_ref()
    }

    pub fn set_data_range(&mut self, range: SharedRange) {
        self.data_range = Some(range);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        let cache = self.cache.get_mut();
        cache.range_revision = None;
        cache.revision += 1;
    }

    /// Recomputes the cached values if the driving range moved since the last call.
    fn with_fresh<R>(&self, f: impl FnOnce(&FunctionCache) -> R) -> R {
        let mut cache = self.cache.lock();
        if let (Some(func), Some(range)) = (&self.func, &self.data_range) {
            match range.try_read() {
                Some(r) => {
                    if cache.range_revision != Some(r.revision()) {
                        let (low, high) = (r.low(), r.high());
                        cache.data = func(low, high);
                        cache.range_revision = Some(r.revision());
                        cache.revision += 1;
                    }
                }
                None => {
                    warn!("function source: driving range is locked, keeping previous data");
                }
            }
        }
        f(&cache)
    }
}

impl DataSource for FunctionDataSource {
    fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    fn get_data(&self) -> Vec<f64> {
        self.with_fresh(|c| c.data.clone())
    }

    fn get_data_mask(&self) -> PlotResult<(Vec<f64>, Vec<bool>)> {
        Ok(self.with_fresh(|c| (c.data.clone(), vec![true; c.data.len()])))
    }

    fn set_data(&mut self, _data: Vec<f64>) -> PlotResult<()> {
        Err(PlotError::Runtime(
            "cannot set data on a function-backed source; change its function or range".into(),
        ))
    }

    fn set_mask(&mut self, _mask: Vec<bool>) -> PlotResult<()> {
        Err(PlotError::NotImplemented("FunctionDataSource does not support masks".into()))
    }

    fn remove_mask(&mut self) -> PlotResult<()> {
        Err(PlotError::NotImplemented("FunctionDataSource does not support masks".into()))
    }

    fn is_masked(&self) -> bool {
        false
    }

    fn get_size(&self) -> usize {
        self.with_fresh(|c| c.data.len())
    }

    fn get_bounds(&self) -> Option<(f64, f64)> {
        // Generated data is often non-monotonic regardless of the declared order.
        self.with_fresh(|c| finite_min_max(&c.data, None))
    }

    fn revision(&self) -> u64 {
        self.with_fresh(|c| c.revision)
    }
}
