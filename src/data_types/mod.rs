pub mod data;
pub mod datasource;
pub mod image;
pub mod plot_configs;
pub mod range;

pub use data::*;
pub use datasource::*;
pub use image::*;
pub use plot_configs::*;
pub use range::*;
