use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeredityError {
    #[error("Family error: {0}")]
    Family(String),

    #[error("Evidence has zero probability under the model (distribution of person index {index} sums to zero)")]
    DegenerateEvidence { index: usize },

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Population of {size} people exceeds the enumeration limit of {max}")]
    PopulationTooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HeredityError>;
