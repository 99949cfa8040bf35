use std::time::Duration;
use thiserror::Error;

/// Every way a round trip can fail to produce a usable reply
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Endpoint reported status {0:?}")]
    Rejected(Option<String>),

    #[error("Endpoint returned an empty reply")]
    EmptyReply,

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("Exchange cancelled")]
    Cancelled,
}
