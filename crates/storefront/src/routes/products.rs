//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{Category, FieldErrors, Product, ProductForm, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::Visitor;
use crate::routes::layout::Layout;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone, Debug)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub list_price: String,
    pub image: String,
    pub category: String,
    pub stock: i64,
    pub brand: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            list_price: product.price.list_price().to_string(),
            image: product.image.clone(),
            category: product.category.clone(),
            stock: product.stock,
            brand: product.brand.clone(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub error: Option<String>,
    pub success: Option<String>,
    pub category: Option<String>,
}

/// Query parameters for the add-product page.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub category: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
}

/// Unknown product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub layout: Layout,
}

/// Add-product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub layout: Layout,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: &'static [Category],
    pub alert: Option<String>,
    pub success: bool,
}

/// Human-readable banner text for listing error codes.
fn error_message(code: &str) -> String {
    match code {
        "delete_failed" => "Error deleting product".to_string(),
        "not_found" => "That product no longer exists".to_string(),
        _ => "Something went wrong".to_string(),
    }
}

/// Human-readable banner text for listing success codes.
fn success_message(code: &str) -> Option<String> {
    match code {
        "deleted" => Some("Product deleted successfully".to_string()),
        _ => None,
    }
}

/// Render the 404 page for a product that is not in the catalog.
pub fn not_found(layout: Layout) -> Response {
    (StatusCode::NOT_FOUND, ProductNotFoundTemplate { layout }).into_response()
}

/// Parse a path segment as a product ID.
pub fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

// =============================================================================
// Listing and Detail
// =============================================================================

/// Display the product listing.
///
/// A failed fetch renders an alert in place of the grid.
#[instrument(skip(state, visitor))]
pub async fn index(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Query(query): Query<ListingQuery>,
) -> Response {
    let layout = Layout::new(&visitor);
    let category = query.category.filter(|c| !c.is_empty());

    let (status, products, error) = match state.catalog().list_products().await {
        Ok(products) => (
            StatusCode::OK,
            products
                .iter()
                .filter(|p| category.as_deref().is_none_or(|c| p.category == c))
                .map(ProductView::from)
                .collect(),
            query.error.as_deref().map(error_message),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch product listing");
            (
                StatusCode::BAD_GATEWAY,
                Vec::new(),
                Some("Could not load products. Please try again later.".to_string()),
            )
        }
    };

    (
        status,
        ProductsIndexTemplate {
            layout,
            products,
            category,
            error,
            success: query.success.as_deref().and_then(success_message),
        },
    )
        .into_response()
}

/// Display a product detail page.
#[instrument(skip(state, visitor))]
pub async fn show(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
) -> Result<Response> {
    let layout = Layout::new(&visitor);
    let id = parse_id(&id)?;

    let Some(product) = state.catalog().find_product(&id).await? else {
        return Ok(not_found(layout));
    };

    Ok(ProductShowTemplate {
        layout,
        product: ProductView::from(&product),
    }
    .into_response())
}

/// Delete a product.
///
/// The listing is updated optimistically; on failure it is reconciled and
/// the visitor sees an alert.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = parse_id(&id)?;

    match state.catalog().delete_product(&id).await {
        Ok(()) => Ok(Redirect::to("/products?success=deleted")),
        Err(e) => {
            tracing::warn!(error = %e, "Product delete failed");
            Ok(Redirect::to("/products?error=delete_failed"))
        }
    }
}

// =============================================================================
// Create (guarded)
// =============================================================================

/// Display the add-product form.
#[instrument(skip(visitor))]
pub async fn new(
    Visitor(visitor): Visitor,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    NewProductTemplate {
        layout: Layout::new(&visitor),
        form: ProductForm::default(),
        errors: FieldErrors::new(),
        categories: &Category::ALL,
        alert: None,
        success: query.success.as_deref() == Some("created"),
    }
}

/// Handle add-product form submission.
#[instrument(skip(state, visitor, form))]
pub async fn create(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Form(form): Form<ProductForm>,
) -> Response {
    let layout = Layout::new(&visitor);

    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                NewProductTemplate {
                    layout,
                    form,
                    errors,
                    categories: &Category::ALL,
                    alert: None,
                    success: false,
                },
            )
                .into_response();
        }
    };

    match state.catalog().create_product(&product).await {
        Ok(()) => {
            tracing::info!(name = %product.name, "Product created");
            Redirect::to("/products/new?success=created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create product");
            (
                StatusCode::BAD_GATEWAY,
                NewProductTemplate {
                    layout,
                    form,
                    errors: FieldErrors::new(),
                    categories: &Category::ALL,
                    alert: Some("Failed to add product. Please try again.".to_string()),
                    success: false,
                },
            )
                .into_response()
        }
    }
}
