use chaco_core::data_types::{linspace, SortOrder, ValueDimension};
use chaco_core::{
    shared_range, ArrayDataSource, DataRange1D, DataSource, FunctionDataSource, ImageData, MultiArrayDataSource,
    PlotError,
};

#[test]
fn test_array_source_basics() {
    let mut source = ArrayDataSource::new(vec![4.0, 1.0, 3.0]);
    assert_eq!(source.get_size(), 3);
    assert_eq!(source.get_data(), vec![4.0, 1.0, 3.0]);
    assert_eq!(source.get_bounds(), Some((1.0, 4.0)));
    assert!(!source.is_masked());

    let revision = source.revision();
    source.set_data(vec![2.0, 5.0]).unwrap();
    assert!(source.revision() > revision);
    assert_eq!(source.get_bounds(), Some((2.0, 5.0)));
}

#[test]
fn test_sorted_source_bounds_use_ends() {
    let source = ArrayDataSource::with_sort_order(vec![1.0, 2.0, 8.0], SortOrder::Ascending);
    assert_eq!(source.get_bounds(), Some((1.0, 8.0)));
    let source = ArrayDataSource::with_sort_order(vec![9.0, 2.0, -1.0], SortOrder::Descending);
    assert_eq!(source.get_bounds(), Some((-1.0, 9.0)));
}

#[test]
fn test_array_source_mask() {
    let mut source = ArrayDataSource::new(vec![1.0, 2.0, 3.0]);
    source.set_mask(vec![true, false, true]).unwrap();
    assert!(source.is_masked());
    let (data, mask) = source.get_data_mask().unwrap();
    assert_eq!(data, vec![1.0, 2.0, 3.0]);
    assert_eq!(mask, vec![true, false, true]);

    let err = source.set_mask(vec![true]).unwrap_err();
    assert!(matches!(err, PlotError::Shape { .. }));

    source.remove_mask().unwrap();
    assert!(!source.is_masked());
}

#[test]
fn test_empty_source_has_no_bounds() {
    let source = ArrayDataSource::new(vec![]);
    assert_eq!(source.get_bounds(), None);
    let source = ArrayDataSource::new(vec![f64::NAN, f64::INFINITY]);
    assert_eq!(source.get_bounds(), None);
}

#[test]
fn test_function_source_rejects_set_data() {
    let mut source = FunctionDataSource::new(|low, high| linspace(low, high, 3));
    let err = source.set_data(vec![1.0, 2.0]).unwrap_err();
    assert!(matches!(err, PlotError::Runtime(_)));
}

#[test]
fn test_function_source_rejects_masks() {
    let mut source = FunctionDataSource::new(|low, high| linspace(low, high, 3));
    assert!(matches!(source.set_mask(vec![true; 3]), Err(PlotError::NotImplemented(_))));
    assert!(matches!(source.remove_mask(), Err(PlotError::NotImplemented(_))));
    assert!(!source.is_masked());
}

#[test]
fn test_function_source_follows_driving_range() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 4.0));
    let mut source = FunctionDataSource::new(|low, high| linspace(low, high, 5));
    assert!(source.get_data().is_empty());

    source.set_data_range(range.clone());
    assert_eq!(source.get_data(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    let revision = source.revision();

    range.write().set_bounds(0.0, 8.0);
    assert_eq!(source.get_data(), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    assert!(source.revision() > revision);
}

#[test]
fn test_function_source_bounds_scan_values() {
    let range = shared_range(DataRange1D::with_bounds(0.0, 3.0));
    let mut source = FunctionDataSource::new(|low, high| {
        linspace(low, high, 4).into_iter().map(|x| (x - 1.5).powi(2)).collect()
    });
    source.set_data_range(range);
    // Declared ascending, but the generated values are not.
    assert_eq!(source.sort_order(), SortOrder::Ascending);
    assert_eq!(source.get_bounds(), Some((0.25, 2.25)));
}

#[test]
fn test_multi_array_source_magnitudes() {
    let mut source = MultiArrayDataSource::new(vec![[3.0, 4.0], [0.0, 1.0]]);
    assert_eq!(source.get_data(), vec![5.0, 1.0]);
    assert_eq!(source.get_bounds(), Some((1.0, 5.0)));
    assert!(matches!(source.set_mask(vec![true, true]), Err(PlotError::NotImplemented(_))));

    source.set_data(vec![1.0, 0.0, 0.0, 2.0, 6.0, 8.0]).unwrap();
    assert_eq!(source.vectors(), &[[1.0, 0.0], [0.0, 2.0], [6.0, 8.0]]);
    assert!(source.set_data(vec![1.0]).is_err());
}

#[test]
fn test_image_data_shape_and_values() {
    let image = ImageData::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(image.shape(), (2, 3));
    assert_eq!(image.get_value(1, 0), Some(4.0));
    assert_eq!(image.get_value(2, 0), None);
    assert_eq!(image.get_bounds(), Some((1.0, 6.0)));
    assert_eq!(image.value_dimension(), ValueDimension::Scalar);

    assert!(ImageData::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    assert!(ImageData::new(2, 2, vec![0.0; 3]).is_err());
}

#[test]
fn test_rgb_image_depth() {
    let image = ImageData::with_depth(1, 2, 3, vec![255.0, 0.0, 0.0, 0.0, 0.0, 255.0]).unwrap();
    assert_eq!(image.value_dimension(), ValueDimension::Image);
    assert_eq!(image.get_pixel(1, 0), Some(&[0.0, 0.0, 255.0][..]));
    assert!(matches!(
        ImageData::with_depth(1, 1, 2, vec![0.0, 0.0]),
        Err(PlotError::Config(_))
    ));
}

#[test]
fn test_image_set_image_bumps_revision() {
    let mut image = ImageData::new(2, 1, vec![0.0, 1.0]).unwrap();
    let revision = image.revision();
    image.set_image(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(image.shape(), (3, 1));
    assert!(image.revision() > revision);
}
