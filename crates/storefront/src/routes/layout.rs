//! Data every page's header needs.

use emporium_core::ClientState;

/// Header state: who is signed in and the cart badge.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub user: Option<String>,
    pub user_initial: String,
    pub cart_count: u32,
}

impl Layout {
    #[must_use]
    pub fn new<S>(state: &ClientState<S>) -> Self {
        let user = state.session().user();
        Self {
            user: user.map(|name| name.as_str().to_string()),
            user_initial: user.map(emporium_core::DisplayName::initial).unwrap_or_default(),
            cart_count: state.cart().item_count(),
        }
    }
}
