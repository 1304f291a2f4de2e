//! S3 client construction and object requests

mod objects;
mod s3_client;

pub use objects::{fetch_range, probe_object_size};
pub use s3_client::{create_s3_client, S3ClientConfig};
