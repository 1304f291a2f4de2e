//! Resolved download request built once from the command line

use std::path::{Path, PathBuf};

use crate::checksum::ChecksumSpec;
use crate::cli::Args;
use crate::download::{TransferOptions, MAX_CONCURRENCY};
use crate::error::{Error, Result};
use crate::providers::S3ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Static {
        access_key: String,
        secret_key: String,
    },
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub key: String,
    pub destination: PathBuf,
    pub credentials: Credentials,
    pub checksum: Option<ChecksumSpec>,
    pub transfer: TransferOptions,
    pub show_progress: bool,
}

impl DownloadRequest {
    pub fn client_config(&self) -> S3ClientConfig<'_> {
        let credentials = match &self.credentials {
            Credentials::Static {
                access_key,
                secret_key,
            } => Some((access_key.as_str(), secret_key.as_str())),
            Credentials::Anonymous => None,
        };

        S3ClientConfig {
            credentials,
            region: &self.region,
            endpoint_url: self.endpoint.as_deref(),
            force_path_style: true,
        }
    }
}

impl TryFrom<Args> for DownloadRequest {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.bucket.is_empty() {
            return Err(Error::Usage("a bucket name is required".to_string()));
        }
        if args.object.is_empty() {
            return Err(Error::Usage("an object key is required".to_string()));
        }

        let credentials = if args.anonymous {
            Credentials::Anonymous
        } else {
            match (args.access_key, args.secret_key) {
                (Some(access_key), Some(secret_key))
                    if !access_key.is_empty() && !secret_key.is_empty() =>
                {
                    Credentials::Static {
                        access_key,
                        secret_key,
                    }
                }
                _ => return Err(Error::MissingCredentials),
            }
        };

        let checksum = match args.checksum.as_deref() {
            Some(spec) if !spec.is_empty() => Some(spec.parse::<ChecksumSpec>()?),
            _ => None,
        };

        if args.part_size == 0 {
            return Err(Error::Usage(
                "--part-size must be greater than zero".to_string(),
            ));
        }
        if args.concurrency == 0 || args.concurrency > MAX_CONCURRENCY {
            return Err(Error::Usage(format!(
                "--concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }

        let destination = resolve_destination(args.dest.as_deref(), &args.object)?;
        let endpoint = Some(args.endpoint).filter(|endpoint| !endpoint.is_empty());

        Ok(DownloadRequest {
            endpoint,
            region: args.region,
            bucket: args.bucket,
            key: args.object,
            destination,
            credentials,
            checksum,
            transfer: TransferOptions {
                part_size: args.part_size,
                concurrency: args.concurrency,
            },
            show_progress: !args.quiet,
        })
    }
}

/// Last `/`-separated segment of an object key, ignoring trailing slashes
pub fn object_base_name(key: &str) -> Option<&str> {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}

/// Final path for the object. A destination ending in a separator or naming an
/// existing directory receives the object's base name, any other destination
/// is used as the file path itself.
pub fn resolve_destination(dest: Option<&Path>, key: &str) -> Result<PathBuf> {
    let base_name = object_base_name(key)
        .ok_or_else(|| Error::Usage(format!("object key {:?} has no file name", key)))?;

    let dest = match dest {
        Some(dest) if !dest.as_os_str().is_empty() => dest,
        _ => return Ok(PathBuf::from(base_name)),
    };

    let names_directory = dest
        .to_string_lossy()
        .ends_with(std::path::is_separator)
        || dest.is_dir();

    if names_directory {
        Ok(dest.join(base_name))
    } else {
        Ok(dest.to_path_buf())
    }
}
