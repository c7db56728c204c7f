use thiserror::Error;
use triage_types::{Region, RegionFault};

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Invalid region #{index} {region:?}: {fault}")]
    InvalidRegion {
        index: usize,
        region: Region,
        fault: RegionFault,
    },

    #[error("Failed to encode annotated image: {0}")]
    Encode(String),
}
