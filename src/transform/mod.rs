pub mod aggregate;
pub mod filter;
pub mod mapping;

pub use aggregate::{bucket_key, bucketize, density_grid, downsample, Bucket, DensityGrid};
pub use filter::{SampleFilter, TimeRange};
pub use mapping::{map_time_to_axis, map_value_to_axis, Bounds};
