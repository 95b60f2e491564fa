//! HTTP adapter error types.

use homesim_domain::error::SimError;

/// Errors specific to the bootstrap fetch.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never got a response (connection refused, DNS, timeout).
    #[error("failed to connect to backend")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body is not a JSON list.
    #[error("failed to decode device list")]
    Decode(#[source] reqwest::Error),

    /// Every attempt failed; carries the last failure.
    #[error("failed to fetch devices after {attempts} attempt(s)")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<BootstrapError>,
    },
}

impl BootstrapError {
    /// Convert into a [`SimError::Transport`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> SimError {
        SimError::Transport(Box::new(self))
    }
}

impl From<BootstrapError> for SimError {
    fn from(err: BootstrapError) -> Self {
        err.into_domain()
    }
}
