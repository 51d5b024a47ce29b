//! Validation error types

use std::fmt;

/// Validation error for a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is missing or empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Numeric field must be a positive number
    NotPositive { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::NotPositive { field } => {
                write!(f, "{} must be a positive number", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every failing field from one validation pass.
///
/// Displays as all failure messages joined with `", "`, so a response
/// lists each bad field rather than just the first one hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "name exceeds maximum length of 256 characters"
        );
    }

    #[test]
    fn aggregate_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Empty { field: "name" });
        errors.push(ValidationError::NotPositive {
            field: "millimeters",
        });
        assert_eq!(
            errors.to_string(),
            "name cannot be empty, millimeters must be a positive number"
        );
    }
}
