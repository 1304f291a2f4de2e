//! Post-download checksum verification

use sha2::Digest;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Read buffer used while hashing the downloaded file (1 MB)
const READ_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha1,
    Sha256,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => write!(f, "md5"),
            ChecksumAlgorithm::Sha1 => write!(f, "sha1"),
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha1" => Ok(ChecksumAlgorithm::Sha1),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl ChecksumAlgorithm {
    /// Hash everything `reader` yields and return the lowercase hex digest.
    pub fn hex_digest<R: Read>(self, reader: R) -> io::Result<String> {
        match self {
            ChecksumAlgorithm::Md5 => hex_digest::<md5::Md5, _>(reader),
            ChecksumAlgorithm::Sha1 => hex_digest::<sha1::Sha1, _>(reader),
            ChecksumAlgorithm::Sha256 => hex_digest::<sha2::Sha256, _>(reader),
        }
    }
}

fn hex_digest<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// An `algorithm:hexdigest` pair given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub algorithm: ChecksumAlgorithm,
    pub expected: String,
}

impl FromStr for ChecksumSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (algorithm, expected) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidChecksum(s.to_string()))?;
        let algorithm = algorithm.parse::<ChecksumAlgorithm>()?;
        if expected.is_empty() {
            return Err(Error::InvalidChecksum(s.to_string()));
        }
        Ok(ChecksumSpec {
            algorithm,
            expected: expected.to_string(),
        })
    }
}

impl ChecksumSpec {
    /// Rewind `reader`, hash its full content and compare against the
    /// expected digest. Returns the calculated digest on a match.
    pub fn verify<R: Read + Seek>(&self, mut reader: R) -> Result<String> {
        reader.seek(SeekFrom::Start(0))?;
        let actual = self.algorithm.hex_digest(&mut reader)?;
        log::debug!(
            "checksum_calculated: algo={} expected={} actual={}",
            self.algorithm,
            self.expected,
            actual
        );

        if actual != self.expected {
            return Err(Error::ChecksumMismatch {
                expected: self.expected.clone(),
                actual,
            });
        }
        Ok(actual)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChecksumAlgorithm, ChecksumSpec};
    use crate::error::Error;
    use std::io::{Cursor, Seek, SeekFrom};

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn hex_digest_matches_known_vectors() {
        let data = b"hello world";
        assert_eq!(
            ChecksumAlgorithm::Md5.hex_digest(&data[..]).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
        assert_eq!(
            ChecksumAlgorithm::Sha1.hex_digest(&data[..]).unwrap(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            ChecksumAlgorithm::Sha256.hex_digest(&data[..]).unwrap(),
            HELLO_SHA256
        );
    }

    #[test]
    fn parse_splits_algorithm_and_digest() {
        let spec: ChecksumSpec = format!("sha256:{}", HELLO_SHA256).parse().unwrap();
        assert_eq!(spec.algorithm, ChecksumAlgorithm::Sha256);
        assert_eq!(spec.expected, HELLO_SHA256);
    }

    #[test]
    fn parse_rejects_unknown_algorithm() {
        let err = "crc32:abc".parse::<ChecksumSpec>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(ref algo) if algo == "crc32"));
    }

    #[test]
    fn parse_rejects_missing_separator_or_digest() {
        assert!(matches!(
            "sha256".parse::<ChecksumSpec>(),
            Err(Error::InvalidChecksum(_))
        ));
        assert!(matches!(
            "md5:".parse::<ChecksumSpec>(),
            Err(Error::InvalidChecksum(_))
        ));
    }

    #[test]
    fn verify_rewinds_before_hashing() {
        let mut cursor = Cursor::new(b"hello world".to_vec());
        cursor.seek(SeekFrom::End(0)).unwrap();

        let spec: ChecksumSpec = format!("sha256:{}", HELLO_SHA256).parse().unwrap();
        assert_eq!(spec.verify(&mut cursor).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn verify_reports_mismatch() {
        let spec: ChecksumSpec = "md5:00000000000000000000000000000000".parse().unwrap();
        let err = spec.verify(Cursor::new(b"hello world".to_vec())).unwrap_err();
        match err {
            Error::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, "00000000000000000000000000000000");
                assert_eq!(actual, "5eb63bbbe01eeed093cb22bb8f5acdc3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_is_case_sensitive() {
        let spec: ChecksumSpec = format!("sha256:{}", HELLO_SHA256.to_uppercase())
            .parse()
            .unwrap();
        assert!(spec.verify(Cursor::new(b"hello world".to_vec())).is_err());
    }
}
