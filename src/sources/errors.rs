use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("payload shape mismatch: {0}")]
    Shape(#[from] serde_json::Error),
}
