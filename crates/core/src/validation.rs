//! Per-field form validation messages.

use std::collections::BTreeMap;

/// Validation messages keyed by form field name.
///
/// Rendered inline next to the offending input. An empty set means the form
/// is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Create an empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field. Later messages for the same field win.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        assert!(FieldErrors::new().is_empty());
    }

    #[test]
    fn test_later_message_wins() {
        let mut errors = FieldErrors::new();
        errors.insert("price", "Valid price is required");
        errors.insert("price", "Price must be positive");
        errors.insert("name", "Product name is required");

        assert!(!errors.is_empty());
        assert_eq!(errors.get("price"), Some("Price must be positive"));
        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(errors.get("stock"), None);
    }
}
