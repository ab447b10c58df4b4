use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] fwscan::Error),
    #[error("{0}")]
    Other(String),
}
