//! Who is using this client.

use crate::types::DisplayName;

/// Authentication status of the visitor.
///
/// Nothing is verified; the display name is whatever the visitor signed in
/// with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<DisplayName>,
}

impl Session {
    /// Nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn signed_in(user: DisplayName) -> Self {
        Self { user: Some(user) }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Display name of the signed-in visitor.
    #[must_use]
    pub const fn user(&self) -> Option<&DisplayName> {
        self.user.as_ref()
    }
}
