use serde::{Deserialize, Serialize};

use crate::error::{Result, SannError};

/// Optional annotations attached to a saved model.
/// All fields are Option<> so files without names deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModelMetadata {
    /// Column names of the training input table (its `#` header).
    pub input_names: Option<Vec<String>>,
    /// Column names of the training output table; printed as the header
    /// of `apply` output.
    pub output_names: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Checks name counts against the network's input/output widths.
    pub fn validate(&self, n_in: usize, n_out: usize) -> Result<()> {
        check_names("input", self.input_names.as_deref(), n_in)?;
        check_names("output", self.output_names.as_deref(), n_out)
    }
}

fn check_names(kind: &str, names: Option<&[String]>, expected: usize) -> Result<()> {
    match names {
        Some(names) if names.len() != expected => Err(SannError::shape(format!(
            "{} {kind} names for {expected} {kind} neurons",
            names.len()
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_are_always_valid() {
        assert!(ModelMetadata::default().validate(3, 1).is_ok());
    }

    #[test]
    fn name_count_must_match_width() {
        let meta = ModelMetadata {
            output_names: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        assert!(meta.validate(3, 2).is_ok());
        assert!(matches!(meta.validate(3, 1), Err(SannError::Shape(_))));
    }
}
