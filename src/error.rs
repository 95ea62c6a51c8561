use thiserror::Error;

/// Failures reported by the appointment, record and pharmacy operations.
///
/// None of these are fatal: the operation that returned one left state
/// untouched (dispensing is the single documented exception) and the caller
/// decides whether to retry with different input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HmsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock for {medicine}: requested {requested}, available {available}")]
    InsufficientStock {
        medicine: String,
        requested: u32,
        available: u32,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl HmsError {
    pub fn not_found(what: impl Into<String>) -> Self {
        HmsError::NotFound(what.into())
    }

    pub fn unauthorized(why: impl Into<String>) -> Self {
        HmsError::Unauthorized(why.into())
    }

    pub fn conflict(why: impl Into<String>) -> Self {
        HmsError::Conflict(why.into())
    }

    pub fn validation(why: impl Into<String>) -> Self {
        HmsError::Validation(why.into())
    }
}

pub type HmsResult<T> = Result<T, HmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_the_medicine() {
        let err = HmsError::InsufficientStock {
            medicine: "Ibuprofen".to_string(),
            requested: 8,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Ibuprofen: requested 8, available 3"
        );
    }

    #[test]
    fn helpers_build_matching_variants() {
        assert_eq!(HmsError::not_found("x"), HmsError::NotFound("x".to_string()));
        assert!(matches!(HmsError::conflict("slot"), HmsError::Conflict(_)));
    }
}
