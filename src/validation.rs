//! Outcome of a validation check.

/// Valid/invalid plus the ordered list of human-readable error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
        }
    }

    pub fn invalid_all(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// All messages joined with `", "`.
    pub fn error_message(&self) -> String {
        self.errors.join(", ")
    }

    /// Valid only if every input is valid; errors are concatenated in order.
    pub fn combine(results: impl IntoIterator<Item = ValidationResult>) -> Self {
        let mut errors = Vec::new();
        let mut valid = true;
        for result in results {
            if !result.valid {
                valid = false;
                errors.extend(result.errors);
            }
        }
        if valid {
            Self::valid()
        } else {
            Self::invalid_all(errors)
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_has_no_errors() {
        let result = ValidationResult::valid();
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
        assert_eq!(result.error_message(), "");
    }

    #[test]
    fn invalid_carries_message() {
        let result = ValidationResult::invalid("Value cannot be empty");
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["Value cannot be empty"]);
    }

    #[test]
    fn combine_all_valid() {
        let result = ValidationResult::combine([ValidationResult::valid(), ValidationResult::valid()]);
        assert!(result.is_valid());
    }

    #[test]
    fn combine_collects_errors_in_order() {
        let result = ValidationResult::combine([
            ValidationResult::invalid("first"),
            ValidationResult::valid(),
            ValidationResult::invalid_all(vec!["second".into(), "third".into()]),
        ]);
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["first", "second", "third"]);
        assert_eq!(result.error_message(), "first, second, third");
    }

    #[test]
    fn combine_empty_is_valid() {
        assert!(ValidationResult::combine(Vec::new()).is_valid());
    }
}
