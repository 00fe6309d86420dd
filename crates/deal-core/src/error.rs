use thiserror::Error;

#[derive(Error, Debug)]
pub enum DealError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unknown value: {0}")]
    UnknownValue(String),
}
