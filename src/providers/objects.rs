use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;

use crate::download::WriteAt;
use crate::error::{Error, Result};

/// Fetch the object's byte length with a metadata-only request
pub async fn probe_object_size(client: &Client, bucket: &str, key: &str) -> Result<u64> {
    let output = client
        .head_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| Error::SizeProbe(DisplayErrorContext(e).to_string()))?;

    let length = output
        .content_length()
        .ok_or_else(|| Error::SizeProbe("response carried no content length".to_string()))?;

    u64::try_from(length)
        .map_err(|_| Error::SizeProbe(format!("invalid content length {}", length)))
}

/// Stream the inclusive byte range `start..=end` of an object into `writer`,
/// starting at offset `start`. Returns the number of bytes written.
pub async fn fetch_range<W: WriteAt + ?Sized>(
    client: &Client,
    bucket: &str,
    key: &str,
    start: u64,
    end: u64,
    writer: &W,
) -> Result<u64> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .range(format!("bytes={}-{}", start, end))
        .send()
        .await
        .map_err(|e| Error::Download(DisplayErrorContext(e).to_string()))?;

    let mut body = output.body;
    let mut offset = start;
    while let Some(chunk) = body
        .try_next()
        .await
        .map_err(|e| Error::Download(format!("failed to read range {}-{}: {}", start, end, e)))?
    {
        if offset + chunk.len() as u64 > end + 1 {
            return Err(Error::Download(format!(
                "range {}-{} returned more data than requested",
                start, end
            )));
        }
        writer.write_at(&chunk, offset)?;
        offset += chunk.len() as u64;
    }

    let written = offset - start;
    if written != end - start + 1 {
        return Err(Error::Download(format!(
            "range {}-{} ended early after {} bytes",
            start, end, written
        )));
    }
    Ok(written)
}
