use http::Method;
use std::time::Duration;
use url::Url;

/// Timing and routing facts for one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStats {
    /// Method of the final hop. Differs from the requested one after a
    /// 301/302/303 redirect.
    pub method: Method,
    /// URL the final response came from.
    pub effective_uri: Url,
    /// Wall time from the first connect to the last body byte.
    pub elapsed: Duration,
    pub redirect_count: u32,
    /// Status of the final response.
    pub status: u16,
}

impl TransferStats {
    pub fn transfer_time(&self) -> Duration {
        self.elapsed
    }

    pub fn was_redirected(&self) -> bool {
        self.redirect_count > 0
    }
}
