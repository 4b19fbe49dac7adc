use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {field} flag '{value}' (expected 1/0, true/false or yes/no)")]
    InvalidFlag { field: String, value: String },
    #[error("duplicate country in policy table: {name}")]
    DuplicateCountry { name: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
