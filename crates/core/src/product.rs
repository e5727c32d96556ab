//! Catalog product records and the product creation form.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};
use crate::validation::FieldErrors;

/// A product as returned by the catalog backend.
///
/// Extra backend fields (timestamps, version counters) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub brand: Option<String>,
}

/// Product categories offered by the creation form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Electronics,
    Clothing,
    Home,
    Books,
    Beauty,
    Sports,
    Toys,
    Food,
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 9] = [
        Self::Electronics,
        Self::Clothing,
        Self::Home,
        Self::Books,
        Self::Beauty,
        Self::Sports,
        Self::Toys,
        Self::Food,
        Self::Other,
    ];

    /// Wire value sent to the catalog.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Home => "home",
            Self::Books => "books",
            Self::Beauty => "beauty",
            Self::Sports => "sports",
            Self::Toys => "toys",
            Self::Food => "food",
            Self::Other => "other",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Home => "Home",
            Self::Books => "Books",
            Self::Beauty => "Beauty",
            Self::Sports => "Sports",
            Self::Toys => "Toys",
            Self::Food => "Food",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`Category`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Request body for creating a product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "serialize_price_as_number")]
    pub price: Price,
    pub image: String,
    pub category: Category,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

/// The catalog expects `price` as a JSON number, not a decimal string.
fn serialize_price_as_number<S>(price: &Price, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    rust_decimal::serde::float::serialize(&price.amount(), serializer)
}

/// Raw product creation form, exactly as submitted.
///
/// Every field is a string so the form can be re-rendered with the visitor's
/// input after a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub brand: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            image: String::new(),
            category: Category::default().as_str().to_string(),
            stock: String::new(),
            brand: String::new(),
        }
    }
}

impl ProductForm {
    /// Validate the form and build the catalog request body.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn validate(&self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name", "Product name is required");
        }

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert("description", "Description is required");
        }

        let price = Decimal::from_str(self.price.trim())
            .ok()
            .filter(|amount| *amount > Decimal::ZERO)
            .and_then(|amount| Price::new(amount).ok());
        if price.is_none() {
            errors.insert("price", "Valid price is required");
        }

        let image = self.image.trim();
        if image.is_empty() {
            errors.insert("image", "Image URL is required");
        }

        let stock = self.stock.trim().parse::<u32>().ok();
        if stock.is_none() {
            errors.insert("stock", "Valid stock quantity is required");
        }

        let category = self.category.parse::<Category>().ok();
        if category.is_none() {
            errors.insert("category", "Choose a category");
        }

        let brand = self.brand.trim();

        match (price, stock, category) {
            (Some(price), Some(stock), Some(category)) if errors.is_empty() => Ok(NewProduct {
                name: name.to_string(),
                description: description.to_string(),
                price,
                image: image.to_string(),
                category,
                stock,
                brand: (!brand.is_empty()).then(|| brand.to_string()),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ProductForm {
        ProductForm {
            name: "Desk Lamp".to_string(),
            description: "Warm light".to_string(),
            price: "49.50".to_string(),
            image: "https://img.example/lamp.jpg".to_string(),
            category: "home".to_string(),
            stock: "12".to_string(),
            brand: String::new(),
        }
    }

    #[test]
    fn test_product_from_backend_json() {
        let json = r#"{
            "_id": "65a1",
            "name": "Desk Lamp",
            "description": "Warm light",
            "price": 100,
            "image": "lamp.jpg",
            "category": "home",
            "stock": 5,
            "__v": 0
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "65a1");
        assert_eq!(product.price.amount(), Decimal::from(100));
        assert_eq!(product.brand, None);
    }

    #[test]
    fn test_valid_form() {
        let product = valid_form().validate().unwrap();
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.price.amount(), Decimal::new(4950, 2));
        assert_eq!(product.category, Category::Home);
        assert_eq!(product.stock, 12);
        assert_eq!(product.brand, None);
    }

    #[test]
    fn test_required_fields() {
        let form = ProductForm::default();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Product name is required"));
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert_eq!(errors.get("price"), Some("Valid price is required"));
        assert_eq!(errors.get("image"), Some("Image URL is required"));
        assert_eq!(errors.get("stock"), Some("Valid stock quantity is required"));
        // Default category is valid
        assert_eq!(errors.get("category"), None);
    }

    #[test]
    fn test_non_positive_price_and_negative_stock() {
        let mut form = valid_form();
        form.price = "0".to_string();
        form.stock = "-1".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), None);
        assert!(errors.get("price").is_some());
        assert!(errors.get("stock").is_some());
    }

    #[test]
    fn test_zero_stock_allowed() {
        let mut form = valid_form();
        form.stock = "0".to_string();
        assert_eq!(form.validate().unwrap().stock, 0);
    }

    #[test]
    fn test_unknown_category() {
        let mut form = valid_form();
        form.category = "weapons".to_string();
        assert!(form.validate().unwrap_err().get("category").is_some());
    }

    #[test]
    fn test_new_product_wire_format() {
        let mut form = valid_form();
        form.brand = " Lumen ".to_string();
        let body = serde_json::to_value(form.validate().unwrap()).unwrap();
        assert_eq!(body["price"], serde_json::json!(49.5));
        assert_eq!(body["category"], "home");
        assert_eq!(body["stock"], 12);
        assert_eq!(body["brand"], "Lumen");

        let body = serde_json::to_value(valid_form().validate().unwrap()).unwrap();
        assert!(body.get("brand").is_none());
    }
}
