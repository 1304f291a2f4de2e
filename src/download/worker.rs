//! Download worker - parallel ranged GETs written into a shared destination

use aws_sdk_s3::Client;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use super::types::{plan_parts, TransferOptions, MAX_CONCURRENCY};
use super::writer::WriteAt;
use crate::error::{Error, Result};
use crate::providers::fetch_range;

/// Keep the first failure, in completion order.
fn record_outcome(first_error: &mut Option<Error>, outcome: std::result::Result<Result<()>, JoinError>) {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => Err(Error::Download(format!("part worker failed: {}", e))),
    };
    if let Err(e) = outcome {
        first_error.get_or_insert(e);
    }
}

/// Download `total_bytes` of `bucket/key` into `writer`, fetching up to
/// `options.concurrency` parts at a time. Returns the number of bytes written.
pub async fn download_object<W>(
    client: &Client,
    bucket: &str,
    key: &str,
    total_bytes: u64,
    writer: Arc<W>,
    options: &TransferOptions,
) -> Result<u64>
where
    W: WriteAt + 'static,
{
    let parts = plan_parts(total_bytes, options.part_size);
    let concurrency = options.concurrency.clamp(1, MAX_CONCURRENCY);
    info!(
        "download_plan: key={} total_bytes={} total_parts={} part_size={} concurrency={}",
        key,
        total_bytes,
        parts.total_parts(),
        options.part_size,
        concurrency
    );

    if parts.total_parts() == 0 {
        return Ok(0);
    }

    let bucket: Arc<str> = Arc::from(bucket);
    let key: Arc<str> = Arc::from(key);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let error_flag = Arc::new(AtomicBool::new(false));
    let written_bytes = Arc::new(AtomicU64::new(0));
    let start_time = Instant::now();
    let mut tasks = JoinSet::new();
    let mut first_error = None;

    for part in parts {
        if error_flag.load(Ordering::SeqCst) {
            break;
        }

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Download(format!("part scheduler closed: {}", e)))?;

        // Reap finished parts so the set never grows past `concurrency`
        while let Some(outcome) = tasks.try_join_next() {
            record_outcome(&mut first_error, outcome);
        }

        let client = client.clone();
        let bucket = bucket.clone();
        let key = key.clone();
        let writer = writer.clone();
        let error_flag = error_flag.clone();
        let written_bytes = written_bytes.clone();

        tasks.spawn(async move {
            let _permit = permit; // Hold permit until done

            // Skip if error already occurred
            if error_flag.load(Ordering::SeqCst) {
                return Ok(());
            }

            let part_timer = Instant::now();
            debug!(
                "part_start: {} part={} range={}..={}",
                key, part.number, part.start, part.end
            );

            match fetch_range(&client, &bucket, &key, part.start, part.end, writer.as_ref()).await {
                Ok(bytes) => {
                    written_bytes.fetch_add(bytes, Ordering::SeqCst);
                    debug!(
                        "part_done: {} part={} bytes={} elapsed_ms={}",
                        key,
                        part.number,
                        bytes,
                        part_timer.elapsed().as_millis()
                    );
                    Ok(())
                }
                Err(e) => {
                    error_flag.store(true, Ordering::SeqCst);
                    debug!("part_failed: {} part={} error={}", key, part.number, e);
                    Err(e)
                }
            }
        });
    }

    // Wait for the remaining parts
    while let Some(outcome) = tasks.join_next().await {
        record_outcome(&mut first_error, outcome);
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let final_bytes = written_bytes.load(Ordering::SeqCst);
    if final_bytes != total_bytes {
        return Err(Error::Download(format!(
            "wrote {} of {} bytes",
            final_bytes, total_bytes
        )));
    }

    info!(
        "download_finish: {} bytes={} elapsed_ms={}",
        key,
        final_bytes,
        start_time.elapsed().as_millis()
    );
    Ok(final_bytes)
}
