//! Insect input validation

use serde::Deserialize;

use super::{ValidationError, ValidationErrors};

/// Maximum length for insect names
const MAX_NAME_LEN: usize = 256;

/// Raw insect fields as they arrive in a request body.
///
/// Every field is optional at this stage; create leaves unset fields
/// NULL and update keeps the stored values for them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsectDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub fact: Option<String>,
    pub territory: Option<String>,
    pub millimeters: Option<f64>,
}

/// Validated insect attributes, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct InsectAttrs {
    pub name: String,
    pub description: Option<String>,
    pub fact: Option<String>,
    pub territory: Option<String>,
    pub millimeters: Option<f64>,
}

impl InsectDraft {
    /// Validate the draft, reporting every failing field.
    ///
    /// # Rules
    /// - `name` required, non-empty after trimming, max 256 characters
    /// - `millimeters`, when present, must be a finite positive number
    pub fn validate(self) -> Result<InsectAttrs, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push(ValidationError::Empty { field: "name" });
                None
            }
            Some(name) if name.len() > MAX_NAME_LEN => {
                errors.push(ValidationError::TooLong {
                    field: "name",
                    max: MAX_NAME_LEN,
                });
                None
            }
            Some(name) => Some(name.to_owned()),
        };

        if let Some(mm) = self.millimeters {
            if !mm.is_finite() || mm <= 0.0 {
                errors.push(ValidationError::NotPositive {
                    field: "millimeters",
                });
            }
        }

        match name {
            Some(name) if errors.is_empty() => Ok(InsectAttrs {
                name,
                description: self.description,
                fact: self.fact,
                territory: self.territory,
                millimeters: self.millimeters,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: Option<&str>, millimeters: Option<f64>) -> InsectDraft {
        InsectDraft {
            name: name.map(str::to_owned),
            millimeters,
            ..Default::default()
        }
    }

    #[test]
    fn valid_draft() {
        let attrs = draft(Some("Luna Moth"), Some(114.0)).validate().unwrap();
        assert_eq!(attrs.name, "Luna Moth");
        assert_eq!(attrs.millimeters, Some(114.0));
    }

    #[test]
    fn trims_name() {
        let attrs = draft(Some("  Luna Moth  "), None).validate().unwrap();
        assert_eq!(attrs.name, "Luna Moth");
    }

    #[test]
    fn missing_name_rejected() {
        let errors = draft(None, None).validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::Empty { field: "name" }]
        );
    }

    #[test]
    fn whitespace_name_rejected() {
        assert!(draft(Some("   "), None).validate().is_err());
    }

    #[test]
    fn negative_millimeters_rejected() {
        let errors = draft(Some("Luna Moth"), Some(-1.0)).validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::NotPositive {
                field: "millimeters"
            }]
        );
    }

    #[test]
    fn nan_millimeters_rejected() {
        assert!(draft(Some("Luna Moth"), Some(f64::NAN)).validate().is_err());
    }

    #[test]
    fn reports_all_failing_fields() {
        let errors = draft(None, Some(0.0)).validate().unwrap_err();
        assert_eq!(errors.errors().len(), 2);
        assert_eq!(
            errors.to_string(),
            "name cannot be empty, millimeters must be a positive number"
        );
    }
}
