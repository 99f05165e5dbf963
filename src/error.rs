use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::AcquireError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("Couldn't open the result file {path}: {source}")]
    OpenOutput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
    #[error("The concurrency limiter was closed while dispatching.")]
    LimiterClosed,

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<AcquireError> for Error {
    fn from(_value: AcquireError) -> Self {
        Error::LimiterClosed
    }
}
