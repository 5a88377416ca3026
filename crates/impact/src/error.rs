use thiserror::Error;

/// Result type for impact model operations
pub type Result<T> = std::result::Result<T, ImpactError>;

/// Errors raised while assembling model inputs.
///
/// The calculation and the splitter themselves never fail; these variants
/// cover the boundary where raw values become an [`crate::InputSet`] or a
/// bucket list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImpactError {
    /// The input source has no data record
    #[error("No data rows found in input")]
    MissingInput,

    /// A required field is absent or not a real number
    #[error("Malformed field `{field}`: {reason}")]
    MalformedField { field: String, reason: String },

    /// A field parsed to NaN or an infinity
    #[error("Field `{field}` is not finite")]
    NonFiniteField { field: String },

    /// A bucket template could not be turned into buckets
    #[error("Invalid bucket template: {0}")]
    BucketTemplate(String),
}

impl ImpactError {
    /// Create a malformed field error for a column that is missing entirely
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.into(),
            reason: "column is missing".to_string(),
        }
    }

    /// Create a malformed field error
    pub fn malformed(field: impl Into<String>, value: &str) -> Self {
        Self::MalformedField {
            field: field.into(),
            reason: format!("{value:?} is not a number"),
        }
    }

    /// Create a bucket template error
    pub fn bucket_template(msg: impl Into<String>) -> Self {
        Self::BucketTemplate(msg.into())
    }
}
