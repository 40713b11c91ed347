//! Per-candidate fetch error.

use std::fmt;

use base64::Engine as _;

/// Why a single candidate URL was abandoned. Never surfaced to callers of the
/// engine; the download loop logs it and tries the next candidate.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, DNS, connection, missing file, ...).
    Curl(curl::Error),
    /// HTTP response had an error status.
    Http(u32),
    /// Body arrived but its SHA-256 differs from the expected digest.
    Integrity { expected: [u8; 32], actual: [u8; 32] },
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Integrity { expected, actual } => {
                let b64 = &base64::engine::general_purpose::STANDARD;
                write!(
                    f,
                    "checksum mismatch: expected {}, got {}",
                    b64.encode(expected),
                    b64.encode(actual)
                )
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Http(_) | FetchError::Integrity { .. } => None,
        }
    }
}
