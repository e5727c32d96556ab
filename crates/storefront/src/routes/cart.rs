//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see [`Visitor`]). Every action
//! is a plain form post that redirects back to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use emporium_core::{Cart, CartEntry, ClearOutcome, Price};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::Visitor;
use crate::routes::layout::Layout;
use crate::routes::products::parse_id;
use crate::state::AppState;

/// Default page to return to after adding to the cart.
const DEFAULT_RETURN_TO: &str = "/products";

/// Cart line display data for templates.
#[derive(Clone, Debug)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub description: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    pub can_decrement: bool,
}

/// Cart totals for templates.
#[derive(Clone, Debug)]
pub struct TotalsView {
    pub subtotal: String,
    pub tax: String,
    pub grand_total: String,
}

impl TotalsView {
    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        Self {
            subtotal: subtotal.to_string(),
            tax: subtotal.tax().to_string(),
            grand_total: subtotal.with_tax().to_string(),
        }
    }
}

/// Cart lines and totals, shared by the cart and checkout pages.
#[derive(Clone, Debug)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart
                .lines()
                .map(|(entry, quantity)| CartLineView {
                    product_id: entry.product_id.to_string(),
                    name: entry.name.clone(),
                    image: entry.image.clone(),
                    description: entry.description.clone(),
                    unit_price: entry.unit_price.to_string(),
                    quantity,
                    line_total: cart.item_total(entry).to_string(),
                    can_decrement: quantity > 1,
                })
                .collect(),
            totals: TotalsView::for_subtotal(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Set quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Clear cart form data. `confirm` is absent until the visitor answers.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    pub confirm: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Clear-cart confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/confirm_clear.html")]
pub struct ConfirmClearTemplate {
    pub layout: Layout,
    pub item_count: u32,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Only same-site paths are accepted as redirect targets.
#[must_use]
pub fn local_path(candidate: Option<&str>) -> Option<&str> {
    candidate.filter(|path| {
        path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Add a product to the cart.
///
/// Open to anonymous visitors. The product is snapshotted from the catalog
/// listing at the moment it is added.
#[instrument(skip(state, visitor))]
pub async fn add(
    State(state): State<AppState>,
    Visitor(mut visitor): Visitor,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let id = parse_id(&form.product_id)?;
    let product = state
        .catalog()
        .find_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    visitor.add_to_cart(CartEntry::snapshot(&product)).await?;

    let target = local_path(form.return_to.as_deref()).unwrap_or(DEFAULT_RETURN_TO);
    Ok(Redirect::to(target))
}

/// Get cart count badge fragment.
pub async fn count(Visitor(visitor): Visitor) -> impl IntoResponse {
    CartCountTemplate {
        count: visitor.cart().item_count(),
    }
}

/// Display the cart page.
#[instrument(skip(visitor))]
pub async fn show(Visitor(visitor): Visitor) -> impl IntoResponse {
    CartShowTemplate {
        layout: Layout::new(&visitor),
        cart: CartView::from(visitor.cart()),
    }
}

/// Set the quantity for a product. Values below 1 are ignored.
#[instrument(skip(visitor))]
pub async fn quantity(
    Visitor(mut visitor): Visitor,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect> {
    let id = parse_id(&form.product_id)?;
    visitor.set_quantity(&id, form.quantity).await?;
    Ok(Redirect::to("/cart"))
}

/// Remove every entry for a product.
#[instrument(skip(visitor))]
pub async fn remove(
    Visitor(mut visitor): Visitor,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let id = parse_id(&form.product_id)?;
    let removed = visitor.remove_from_cart(&id).await?;
    tracing::debug!(removed, "Removed cart entries");
    Ok(Redirect::to("/cart"))
}

/// Clear the cart after confirmation.
///
/// Without an answer the confirmation page is shown (unless the cart is
/// already empty). Only `confirm=yes` clears.
#[instrument(skip(visitor))]
pub async fn clear(
    Visitor(mut visitor): Visitor,
    Form(form): Form<ClearCartForm>,
) -> Result<Response> {
    let answer = form.confirm.as_deref();
    let outcome = visitor.clear_cart(|| answer == Some("yes")).await?;

    if outcome == ClearOutcome::Declined && answer.is_none() {
        return Ok(ConfirmClearTemplate {
            layout: Layout::new(&visitor),
            item_count: visitor.cart().item_count(),
        }
        .into_response());
    }

    tracing::debug!(?outcome, "Clear cart");
    Ok(Redirect::to("/cart").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use emporium_core::ProductId;

    use super::*;

    #[test]
    fn test_local_path() {
        assert_eq!(local_path(Some("/products/a1")), Some("/products/a1"));
        assert_eq!(local_path(Some("//evil.example")), None);
        assert_eq!(local_path(Some("/\\evil.example")), None);
        assert_eq!(local_path(Some("https://evil.example")), None);
        assert_eq!(local_path(None), None);
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        let id = ProductId::parse("a").unwrap();
        cart.add(CartEntry {
            product_id: id.clone(),
            name: "Lamp".to_string(),
            image: String::new(),
            description: String::new(),
            unit_price: Price::new(Decimal::from(100)).unwrap(),
        });
        cart.set_quantity(&id, 2);

        let view = CartView::from(&cart);
        assert_eq!(view.totals.subtotal, "₹200.00");
        assert_eq!(view.totals.tax, "₹36.00");
        assert_eq!(view.totals.grand_total, "₹236.00");
        assert_eq!(view.lines[0].line_total, "₹200.00");
        assert!(view.lines[0].can_decrement);
        assert_eq!(view.item_count, 2);
    }
}
