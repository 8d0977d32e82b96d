pub mod aggregate;
pub mod error;
pub mod options;
pub mod outputs;
pub mod resampler;
pub mod resolution;

pub use aggregate::{aggregate, ResampledRecord, ResampledTable};
pub use error::{ResampleError, Result};
pub use options::ResampleOptions;
pub use outputs::{
    KeyedRow, KeyedTable, LatLon, PointCollection, PointFeature, PointGeometry, ResampleOutput,
    CRS_EPSG_4326, LAT_LONG_COLUMN,
};
pub use resampler::{resample, resample_with};
pub use resolution::{BucketLabel, Resolution};
