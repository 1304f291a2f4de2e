use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

pub mod checksum;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod providers;

pub use checksum::{ChecksumAlgorithm, ChecksumSpec};
pub use cli::Args;
pub use config::{resolve_destination, Credentials, DownloadRequest};
pub use error::{Error, Result};

use download::{download_object, ProgressObserver, ProgressWriter, StagedFile, TransferState};
use providers::{create_s3_client, probe_object_size};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub destination: PathBuf,
    pub bytes_written: u64,
    /// Calculated digest, when a checksum was requested
    pub checksum: Option<String>,
}

/// Run the whole pipeline for one request: probe the size, download into a
/// temporary file, verify the checksum and move the file into place.
///
/// `make_observer` receives the object size and returns the observer that is
/// told about every write.
pub async fn fetch<O, F>(request: &DownloadRequest, make_observer: F) -> Result<DownloadSummary>
where
    O: ProgressObserver + 'static,
    F: FnOnce(u64) -> O,
{
    let client = create_s3_client(&request.client_config()).await;

    let total_bytes = probe_object_size(&client, &request.bucket, &request.key).await?;
    println!(
        "Creating file object: {} with total size of {}",
        request.destination.display(),
        total_bytes
    );

    let mut staged = StagedFile::create(&request.destination)?;
    let state = Arc::new(TransferState::new(total_bytes));
    let writer = Arc::new(ProgressWriter::new(
        staged.writer()?,
        (state.clone(), make_observer(total_bytes)),
    ));

    println!(
        "Downloading object: {} from bucket: {}",
        request.key, request.bucket
    );
    let bytes_written = download_object(
        &client,
        &request.bucket,
        &request.key,
        total_bytes,
        writer,
        &request.transfer,
    )
    .await?;
    log::debug!(
        "transfer_state: written={} total={} percent={}",
        state.bytes_written(),
        state.total_bytes(),
        state.percent()
    );
    if state.bytes_written() != state.total_bytes() {
        return Err(Error::Download(format!(
            "writer received {} of {} bytes",
            state.bytes_written(),
            state.total_bytes()
        )));
    }

    let checksum = match &request.checksum {
        Some(spec) => {
            println!("algo: {} hash: {}", spec.algorithm, spec.expected);
            match staged.verify(spec) {
                Ok(digest) => {
                    println!("calculated sum: {}", digest);
                    Some(digest)
                }
                Err(e) => return Err(staged.reject(e)),
            }
        }
        None => None,
    };

    let destination = staged.finalize()?;
    log::info!(
        "download_complete: destination={} bytes={}",
        destination.display(),
        bytes_written
    );

    Ok(DownloadSummary {
        destination,
        bytes_written,
        checksum,
    })
}

fn report(err: &Error) -> ExitCode {
    eprintln!(
        "[Error] We encountered the following error:\n\n\t{}\n",
        err
    );
    if err.is_usage() {
        eprintln!("{}", Args::command().render_usage());
    }
    ExitCode::FAILURE
}

pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let request = match DownloadRequest::try_from(args) {
        Ok(request) => request,
        Err(e) => return report(&e),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return report(&Error::Io(e)),
    };

    let bar = download::transfer_bar(request.show_progress);
    let result = runtime.block_on(fetch(&request, |total_bytes| {
        bar.set_length(total_bytes);
        bar.clone()
    }));

    match result {
        Ok(summary) => {
            bar.finish();
            println!("file downloaded, {} bytes", summary.bytes_written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            bar.abandon();
            report(&e)
        }
    }
}
