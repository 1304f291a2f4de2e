//! Command-line flags

use clap::Parser;
use std::path::PathBuf;

use crate::download::{DEFAULT_CONCURRENCY, DEFAULT_PART_SIZE};

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Only required by request signing, the download itself ignores it.
pub const DEFAULT_REGION: &str = "us-west-2";

const USAGE_NOTE: &str = "\
NOTE: You must specify the bucket and object file to download.
Remember you must also specify your access key and secret key as either environment variables
or pass them as flags to the command, unless the object is public (-p).";

/// s3get - download an object from an S3-compatible bucket
#[derive(Debug, Clone, Parser)]
#[command(name = "s3get", version, about, long_about = None, after_help = USAGE_NOTE)]
pub struct Args {
    /// URL endpoint for where to get your object
    #[arg(short = 'e', long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bucket name
    #[arg(short = 'b', long)]
    pub bucket: String,

    /// Object to download. If the object is under a directory include the whole path: subdir/myobject.file
    #[arg(short = 'o', long = "object", value_name = "KEY")]
    pub object: String,

    /// Destination file, or directory ending in a path separator
    #[arg(short = 'd', long = "dest", value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Access key
    #[arg(short = 'a', long, env = "AWS_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret key
    #[arg(short = 's', long, env = "AWS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// For public objects. Will skip authentication
    #[arg(short = 'p', long = "public")]
    pub anonymous: bool,

    /// The algo:hash to verify the object checksum. Algos supported are: sha256, sha1 & md5
    #[arg(short = 'c', long, value_name = "ALGO:HASH")]
    pub checksum: Option<String>,

    /// Signing region
    #[arg(short = 'r', long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Bytes fetched by each ranged request
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_PART_SIZE)]
    pub part_size: u64,

    /// Number of ranges fetched in parallel
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Do not render the progress bar
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::{Args, DEFAULT_ENDPOINT};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn short_flags_map_to_fields() {
        let args = Args::try_parse_from([
            "s3get", "-e", "http://localhost:9000", "-b", "bucket", "-o", "dir/file.bin", "-d",
            "/tmp/", "-p", "-c", "md5:abc",
        ])
        .unwrap();

        assert_eq!(args.endpoint, "http://localhost:9000");
        assert_eq!(args.bucket, "bucket");
        assert_eq!(args.object, "dir/file.bin");
        assert_eq!(args.dest.as_deref(), Some(std::path::Path::new("/tmp/")));
        assert!(args.anonymous);
        assert_eq!(args.checksum.as_deref(), Some("md5:abc"));
    }

    #[test]
    fn endpoint_defaults_to_public_cloud() {
        let args = Args::try_parse_from(["s3get", "-b", "bucket", "-o", "key", "-p"]).unwrap();
        assert_eq!(args.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(args.dest, None);
    }

    #[test]
    fn bucket_is_required() {
        assert!(Args::try_parse_from(["s3get", "-o", "key", "-p"]).is_err());
    }
}
