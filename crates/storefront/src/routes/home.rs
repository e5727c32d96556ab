//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use emporium_core::Category;

use crate::filters;
use crate::middleware::Visitor;
use crate::routes::layout::Layout;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of products shown in the featured grid.
const FEATURED_COUNT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<ProductView>,
    pub categories: &'static [Category],
    pub catalog_unavailable: bool,
}

/// Display the home page.
///
/// The featured grid is the first products of the catalog listing. If the
/// catalog is down the page still renders, without the grid.
#[instrument(skip(state, visitor))]
pub async fn home(State(state): State<AppState>, Visitor(visitor): Visitor) -> impl IntoResponse {
    let (featured, catalog_unavailable) = match state.catalog().list_products().await {
        Ok(products) => (
            products
                .iter()
                .take(FEATURED_COUNT)
                .map(ProductView::from)
                .collect(),
            false,
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch featured products");
            (Vec::new(), true)
        }
    };

    HomeTemplate {
        layout: Layout::new(&visitor),
        featured,
        categories: &Category::ALL,
        catalog_unavailable,
    }
}
