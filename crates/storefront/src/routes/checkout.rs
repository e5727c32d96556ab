//! Checkout and buy-now pages.
//!
//! Both are order summaries only; no order is placed and no payment is taken.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Visitor;
use crate::routes::cart::{CartView, TotalsView};
use crate::routes::layout::Layout;
use crate::routes::products::{ProductView, not_found, parse_id};
use crate::state::AppState;

/// Checkout summary template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Buy-now summary template.
#[derive(Template, WebTemplate)]
#[template(path = "buy_now.html")]
pub struct BuyNowTemplate {
    pub layout: Layout,
    pub product: ProductView,
    pub totals: TotalsView,
}

/// Display the checkout summary. An empty cart goes back to the cart page.
#[instrument(skip(visitor))]
pub async fn checkout(Visitor(visitor): Visitor) -> Response {
    if visitor.cart().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        layout: Layout::new(&visitor),
        cart: CartView::from(visitor.cart()),
    }
    .into_response()
}

/// Display a single-product summary with quantity 1.
#[instrument(skip(state, visitor))]
pub async fn buy_now(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
) -> Result<Response> {
    let layout = Layout::new(&visitor);
    let id = parse_id(&id)?;

    let Some(product) = state.catalog().find_product(&id).await? else {
        return Ok(not_found(layout));
    };

    Ok(BuyNowTemplate {
        layout,
        totals: TotalsView::for_subtotal(product.price),
        product: ProductView::from(&product),
    }
    .into_response())
}
