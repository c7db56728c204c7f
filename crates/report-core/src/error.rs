use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Nothing to report: no findings and an empty narrative")]
    EmptyRecord,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}
