use thiserror::Error;

use super::stores::StoreError;

/// Failures surfaced by page resolution.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// No page matches the requested locator. Recoverable: the boundary layer
    /// answers with its standard not-found response.
    #[error("unable to find page: {0}")]
    PageNotFound(String),

    /// Internal route names may not shadow error-handling routes. Signals
    /// caller misuse and is fatal to the request.
    #[error("illegal internal route name `{0}`: an internal page cannot start with `error`")]
    ReservedInternalName(String),

    /// Store failure, propagated unchanged. The core performs no retries.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolverError {
    /// True when the failure is an ordinary unmatched locator.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PageNotFound(_))
    }
}
