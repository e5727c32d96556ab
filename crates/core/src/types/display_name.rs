//! Session display identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DisplayName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayNameError {
    /// The input is empty or only whitespace.
    #[error("display name cannot be empty")]
    Empty,
}

/// The identifier shown for a signed-in visitor.
///
/// Usually the email address typed into the login form, but any non-empty
/// string is accepted: nothing here claims the visitor proved who they are.
///
/// Surrounding whitespace is trimmed; there is no length limit.
///
/// ## Examples
///
/// ```
/// use emporium_core::DisplayName;
///
/// let name = DisplayName::parse("  e@x.com ").unwrap();
/// assert_eq!(name.as_str(), "e@x.com");
/// assert_eq!(name.initial(), "E");
///
/// assert!(DisplayName::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Parse a `DisplayName` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayNameError::Empty`] if the trimmed input is empty.
    pub fn parse(s: &str) -> Result<Self, DisplayNameError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(DisplayNameError::Empty);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character, upper-cased, for avatar badges.
    #[must_use]
    pub fn initial(&self) -> String {
        self.0
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
