//! Wire types for the Marketplace REST API.
//!
//! Every endpoint wraps its payload in an [`Envelope`]. Field names follow the
//! backend's camelCase JSON; fields the backend sometimes leaves out or sends
//! as `null` decode to their defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use marketplace_core::{CartItemId, Email, Price, ProductId, ProductSort, UserId};

/// Decode `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Envelope
// =============================================================================

const fn assume_success() -> bool {
    true
}

/// Response envelope shared by every endpoint: `{success, data, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the backend considers the call successful. Only an explicit
    /// `false` counts as a failure.
    #[serde(default = "assume_success")]
    pub success: bool,
    /// Payload, present on success.
    pub data: Option<T>,
    /// Human-readable message, usually present on failure.
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Auth Types
// =============================================================================

/// Authenticated user identity returned at login.
///
/// Display fields beyond `email` and `name` are kept verbatim in `extra` so
/// they survive a round trip through the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Any other display fields sent by the backend.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl User {
    /// Best available label for the navbar: name, then email, then ID.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.email.as_ref().map(Email::as_str))
            .unwrap_or_else(|| self.id.as_str())
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Payload of a successful `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    /// Bearer token; an empty token means the login did not succeed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
    /// The authenticated user.
    #[serde(default)]
    pub user: Option<User>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Long description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Current price.
    pub price: Price,
    /// Image URLs, primary image first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: i64,
    /// Average rating on a 0-5 scale.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    /// Number of reviews behind `rating`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: i64,
    /// Original price, shown struck through when above `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Price>,
    /// Free-form specification table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, String>>,
}

impl Product {
    /// Primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether at least one unit can be added to the cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Compare-at price, only when it is actually higher than the price.
    #[must_use]
    pub fn markdown_from(&self) -> Option<Price> {
        self.compare_at_price.filter(|original| *original > self.price)
    }
}

/// Payload of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductList {
    /// Matching products in server order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
}

/// Filter and sort options for `GET /products`.
///
/// Options left as `None` are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Substring filter on the product name/description.
    pub search: Option<String>,
    /// Sort order.
    pub sort: Option<ProductSort>,
    /// Only featured products.
    pub featured: Option<bool>,
    /// Minimum price (inclusive).
    pub min_price: Option<Price>,
    /// Maximum price (inclusive).
    pub max_price: Option<Price>,
}

impl ProductQuery {
    /// Query string pairs for the options that are set, using the backend's names.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(featured) = self.featured {
            pairs.push(("featured", featured.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.amount().to_string()));
        }
        pairs
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product snapshot embedded in a cart line by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price at the time the cart was read.
    pub price: Price,
    /// Image URLs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: i64,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart line ID.
    pub id: CartItemId,
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Quantity on the line.
    pub quantity: i64,
    /// Product snapshot, when the backend embeds one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<CartProduct>,
}

impl CartItem {
    /// Unit price, zero when no product snapshot is embedded.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.product.as_ref().map_or(Price::ZERO, |p| p.price)
    }

    /// Unit price times quantity, for display next to the line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price() * self.quantity
    }

    /// Product name, or a generic label without a snapshot.
    #[must_use]
    pub fn name(&self) -> &str {
        self.product.as_ref().map_or("Product", |p| p.name.as_str())
    }

    /// Primary image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.product
            .as_ref()
            .and_then(|p| p.images.first())
            .map(String::as_str)
    }

    /// Whether the quantity can go up by one without exceeding stock.
    ///
    /// Without a product snapshot the stock is unknown and the backend decides.
    #[must_use]
    pub fn can_increment(&self) -> bool {
        self.product
            .as_ref()
            .is_none_or(|p| self.quantity < p.stock)
    }

    /// Whether the quantity can go down by one without dropping below 1.
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }
}

/// Payload of `GET /cart`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CartSnapshot {
    /// Cart lines in server order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<CartItem>,
    /// Server-computed sum of price x quantity.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtotal: Price,
}

/// Body of `POST /cart`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
    pub quantity: i64,
}

/// Body of `PUT /cart/:productId`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateCartItemRequest {
    pub quantity: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_full_payload() {
        let json = r#"{
            "id": "p1",
            "name": "Desk Lamp",
            "description": "Warm light",
            "price": 49.99,
            "images": ["https://cdn.example.com/lamp.jpg"],
            "stock": 5,
            "rating": 4.5,
            "reviewCount": 12,
            "compareAtPrice": 59.99,
            "specifications": {"Wattage": "9W", "Color": "Brass"}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::from_cents(4999));
        assert_eq!(product.review_count, 12);
        assert_eq!(product.markdown_from(), Some(Price::from_cents(5999)));
        assert_eq!(
            product.specifications.unwrap().get("Wattage").map(String::as_str),
            Some("9W")
        );
    }

    #[test]
    fn test_product_sparse_payload_uses_defaults() {
        let json = r#"{"id": "p2", "name": "Mug", "price": 8, "images": null, "rating": null}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.images.is_empty());
        assert!(product.primary_image().is_none());
        assert_eq!(product.stock, 0);
        assert!(!product.in_stock());
        assert!(product.rating.abs() < f64::EPSILON);
        assert!(product.markdown_from().is_none());
    }

    #[test]
    fn test_compare_at_price_ignored_when_not_higher() {
        let json = r#"{"id": "p3", "name": "Pen", "price": 3.5, "compareAtPrice": 3.5}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.markdown_from().is_none());
    }

    #[test]
    fn test_cart_snapshot_with_embedded_products() {
        let json = r#"{
            "items": [{
                "id": "c1",
                "productId": "p1",
                "quantity": 2,
                "product": {"id": "p1", "name": "Desk Lamp", "price": 49.99, "images": [], "stock": 2}
            }],
            "subtotal": 99.98
        }"#;
        let cart: CartSnapshot = serde_json::from_str(json).unwrap();
        let line = &cart.items[0];
        assert_eq!(line.line_total(), Price::from_cents(9998));
        assert_eq!(cart.subtotal, Price::from_cents(9998));
        assert!(!line.can_increment());
        assert!(line.can_decrement());
    }

    #[test]
    fn test_cart_snapshot_missing_and_null_fields() {
        let empty: CartSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, CartSnapshot::default());

        let nulls: CartSnapshot =
            serde_json::from_str(r#"{"items": null, "subtotal": null}"#).unwrap();
        assert!(nulls.items.is_empty());
        assert_eq!(nulls.subtotal, Price::ZERO);
    }

    #[test]
    fn test_cart_item_without_snapshot() {
        let json = r#"{"id": "c9", "productId": "gone", "quantity": 1}"#;
        let line: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(line.name(), "Product");
        assert_eq!(line.unit_price(), Price::ZERO);
        assert!(line.can_increment());
        assert!(!line.can_decrement());
    }

    #[test]
    fn test_product_query_omits_absent_options() {
        assert!(ProductQuery::default().to_pairs().is_empty());

        let query = ProductQuery {
            search: Some("lamp".to_string()),
            sort: Some(ProductSort::PriceDesc),
            featured: None,
            min_price: Some(Price::from_cents(1000)),
            max_price: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("search", "lamp".to_string()),
                ("sort", "price_desc".to_string()),
                ("minPrice", "10.00".to_string()),
            ]
        );
    }

    #[test]
    fn test_product_query_skips_blank_search() {
        for blank in ["", "   "] {
            let query = ProductQuery {
                search: Some(blank.to_string()),
                ..Default::default()
            };
            assert!(query.to_pairs().is_empty());
        }
    }

    #[test]
    fn test_user_keeps_extra_display_fields() {
        let json = r#"{"id": "u1", "email": "john.doe@example.com", "name": "John", "avatar": "a.png"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name(), "John");
        assert_eq!(user.extra.get("avatar").and_then(|v| v.as_str()), Some("a.png"));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["avatar"], "a.png");
    }

    #[test]
    fn test_envelope_success_flag() {
        let missing: Envelope<serde_json::Value> = serde_json::from_str(r#"{"data": 1}"#).unwrap();
        assert!(missing.success);

        let failed: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success": false, "message": "Invalid credentials"}"#)
                .unwrap();
        assert!(!failed.success);
        assert!(failed.data.is_none());
        assert_eq!(failed.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_login_data_decodes_token_and_user() {
        let data: LoginData =
            serde_json::from_str(r#"{"token": "abc", "user": {"id": "u1"}}"#).unwrap();
        assert_eq!(data.token, "abc");
        assert_eq!(data.user.unwrap().display_name(), "u1");
    }

    #[test]
    fn test_add_to_cart_request_body() {
        let product_id = ProductId::new("p1");
        let body = serde_json::to_value(AddToCartRequest {
            product_id: &product_id,
            quantity: 2,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"productId": "p1", "quantity": 2}));
    }
}
