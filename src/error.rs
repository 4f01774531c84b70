use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("source setup failed: {0}")]
    SourceSetup(#[from] crate::sources::errors::SourceError),
}
