//! Map fetch failures to the kinds the download loop logs differently.

use super::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 404/410 or a missing `file://` path.
    NotFound,
    /// Connect or read timeout.
    Timeout,
    /// DNS lookup failed.
    UnknownHost,
    /// Connection refused, reset or closed early.
    Connection,
    /// Downloaded bytes did not match the checksum.
    Integrity,
    Other,
}

pub fn classify_http_status(code: u32) -> FailureKind {
    match code {
        404 | 410 => FailureKind::NotFound,
        _ => FailureKind::Other,
    }
}

/// `CURLE_REMOTE_FILE_NOT_FOUND`.
const REMOTE_FILE_NOT_FOUND: u32 = 78;

pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return FailureKind::UnknownHost;
    }
    if e.is_file_couldnt_read_file() || e.code() as u32 == REMOTE_FILE_NOT_FOUND {
        return FailureKind::NotFound;
    }
    if e.is_couldnt_connect()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

pub fn classify(e: &FetchError) -> FailureKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Integrity { .. } => FailureKind::Integrity,
    }
}
