//! Image-processing collaborator boundary and the default raster backend

pub mod backend;
pub mod raster;

pub use backend::{HsvImage, ImageBackend, Region};
pub use raster::RasterBackend;
