use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Identifier = u32;

/// Why probing a single id didn't produce a book name.
/// None of these stop the run, they are recorded like any other result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// The request for the page couldn't be built.
    #[error("{0}")]
    Request(String),
    /// Connection errors and timeouts.
    #[error("{0}")]
    Transport(String),
    /// Non-2xx answer, holds the status line, e.g. `404 Not Found`.
    #[error("{0}")]
    Status(String),
    #[error("{0}")]
    Document(String),
    /// The page loaded but says there is nothing behind this id.
    #[error("No Page")]
    NoPage,
}

/// The single result of probing one id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub id: Identifier,
    pub result: Result<String, Failure>,
}

impl Outcome {
    pub fn found(id: Identifier, book_name: impl Into<String>) -> Self {
        Self {
            id,
            result: Ok(book_name.into()),
        }
    }

    pub fn failed(id: Identifier, failure: Failure) -> Self {
        Self {
            id,
            result: Err(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn book_name(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.result.as_ref().err()
    }

    pub fn to_record(&self) -> Record {
        let (book_name, reason) = match &self.result {
            Ok(name) => (name.clone(), String::new()),
            Err(failure) => (String::new(), failure.to_string()),
        };
        Record {
            id: self.id,
            ok: self.is_success(),
            book_name,
            reason,
        }
    }

    /// One JSON line, newline included.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(&self.to_record())?;
        line.push(b'\n');
        Ok(line)
    }
}

/// The on-disk shape of an [`Outcome`]. The absent side is written as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Identifier,
    pub ok: bool,
    pub book_name: String,
    pub reason: String,
}
