//! Blocking HTTP(S)/file fetches for repository candidates.
//!
//! One libcurl easy handle per request, fixed connect and read (stall)
//! timeouts, and a fixed `User-Agent`. A timed-out or failed candidate is
//! abandoned, never retried; the caller moves on to the next URL.

mod classify;
mod error;

pub use classify::{classify, classify_curl_error, classify_http_status, FailureKind};
pub use error::FetchError;

use std::time::Duration;

/// Identifying client header sent with every request.
pub const USER_AGENT: &str = concat!("depot/", env!("CARGO_PKG_VERSION"));

/// Connect timeout for every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Abort when no body bytes arrive for this long.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Fetcher {
    user_agent: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

impl Fetcher {
    /// Same fetcher with a different stall timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// GETs `url` and returns the whole body.
    ///
    /// Redirects are followed. `file://` URLs are served by libcurl too, which
    /// is how a local Maven repository works as a candidate.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        // Stall detection stands in for a socket read timeout.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.read_timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        // file:// transfers report 0.
        let code = easy.response_code()?;
        if code >= 400 {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
