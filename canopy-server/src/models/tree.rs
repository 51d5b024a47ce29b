//! Tree input validation

use serde::Deserialize;

use super::{ValidationError, ValidationErrors};

/// Maximum length for tree names
const MAX_NAME_LEN: usize = 256;

/// Raw tree fields as they arrive in a request body.
///
/// The wire names differ from the columns: `name` is stored in the
/// `tree` column, `height` in `height_ft`, and `size` in
/// `ground_circumference_ft`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeDraft {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "height")]
    pub height_ft: Option<f64>,
    #[serde(rename = "size")]
    pub ground_circumference_ft: Option<f64>,
}

/// Validated tree attributes, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct TreeAttrs {
    pub tree: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub ground_circumference_ft: Option<f64>,
}

impl TreeDraft {
    /// Validate the draft, reporting every failing field.
    ///
    /// # Rules
    /// - `name` required, non-empty after trimming, max 256 characters
    /// - `height` and `size`, when present, must be finite positive numbers
    pub fn validate(self) -> Result<TreeAttrs, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let tree = match self.name.as_deref().map(str::trim) {
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

        if let Some(height) = self.height_ft {
            if !height.is_finite() || height <= 0.0 {
                errors.push(ValidationError::NotPositive { field: "height" });
            }
        }

        if let Some(size) = self.ground_circumference_ft {
            if !size.is_finite() || size <= 0.0 {
                errors.push(ValidationError::NotPositive { field: "size" });
            }
        }

        match tree {
            Some(tree) if errors.is_empty() => Ok(TreeAttrs {
                tree,
                location: self.location,
                height_ft: self.height_ft,
                ground_circumference_ft: self.ground_circumference_ft,
            }),
            _ => Err(errors),
        }
    }
}
