use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Confidence must be between 0 and 100, got {0}")]
    ConfidenceOutOfRange(u32),
}
