//! Product detail page.

use std::fmt::Write;

use marketplace_storefront::Product;

use super::{IMAGE_PLACEHOLDER, heading, rating_line};

/// `5 in stock` or `Out of Stock`.
pub fn stock_badge(product: &Product) -> String {
    if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "Out of Stock".to_string()
    }
}

/// Render a single product.
pub fn render(product: &Product) -> String {
    let mut out = String::from("<- Back to Products (mp products)\n\n");
    out.push_str(&heading(&product.name));

    let _ = writeln!(out, "{}", rating_line(product.rating, product.review_count));
    match product.markdown_from() {
        Some(original) => {
            let _ = writeln!(out, "{}  (was {original})", product.price);
        }
        None => {
            let _ = writeln!(out, "{}", product.price);
        }
    }

    out.push('\n');
    if product.images.is_empty() {
        let _ = writeln!(out, "{IMAGE_PLACEHOLDER}");
    } else {
        for (index, image) in product.images.iter().enumerate() {
            let _ = writeln!(out, "Image {}: {image}", index + 1);
        }
    }

    if !product.description.is_empty() {
        let _ = write!(out, "\nDescription\n  {}\n", product.description);
    }

    if let Some(specs) = product.specifications.as_ref().filter(|s| !s.is_empty()) {
        out.push_str("\nSpecifications\n");
        for (key, value) in specs {
            let _ = writeln!(out, "  {key}: {value}");
        }
    }

    let _ = write!(out, "\n{}\n", stock_badge(product));
    if product.in_stock() {
        let _ = writeln!(
            out,
            "Add to cart: mp cart add {} --quantity <1-{}>",
            product.id, product.stock
        );
    }
    out
}

/// Refusal to add a sold-out product, followed by its detail page.
pub fn out_of_stock(product: &Product) -> String {
    format!(
        "{} is Out of Stock and cannot be added to the cart.\n\n{}",
        product.name,
        render(product)
    )
}

/// Confirmation after adding to the cart.
///
/// Mentions the adjustment when the requested quantity was clamped.
pub fn added(product: &Product, requested: i64, quantity: i64) -> String {
    let mut out = String::from("Item added to cart!\n");
    if requested != quantity {
        let _ = writeln!(
            out,
            "Quantity adjusted from {requested} to {quantity} for {}.",
            product.name
        );
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lamp() -> Product {
        serde_json::from_str(
            r#"{"id": "p1", "name": "Desk Lamp", "description": "Warm light", "price": 49.99,
                "compareAtPrice": 59.99, "images": ["a.jpg", "b.jpg"], "stock": 5,
                "rating": 4.5, "reviewCount": 12,
                "specifications": {"Wattage": "9W", "Color": "Brass"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_full_detail() {
        let page = render(&lamp());
        assert!(page.contains("Desk Lamp\n========="));
        assert!(page.contains("$49.99  (was $59.99)"));
        assert!(page.contains("Image 2: b.jpg"));
        assert!(page.contains("  Color: Brass\n  Wattage: 9W"));
        assert!(page.contains("5 in stock"));
        assert!(page.contains("mp cart add p1 --quantity <1-5>"));
    }

    #[test]
    fn test_out_of_stock_without_images() {
        let product: Product =
            serde_json::from_str(r#"{"id": "p2", "name": "Mug", "price": 8, "compareAtPrice": 6}"#)
                .unwrap();
        let page = render(&product);
        assert!(page.contains("Out of Stock"));
        assert!(page.contains(IMAGE_PLACEHOLDER));
        assert!(!page.contains("was"));
        assert!(!page.contains("mp cart add"));
    }

    #[test]
    fn test_out_of_stock_notice() {
        let mut product = lamp();
        product.stock = 0;
        let page = out_of_stock(&product);
        assert!(page.starts_with("Desk Lamp is Out of Stock"));
        assert!(!page.contains("mp cart add"));
    }

    #[test]
    fn test_added_mentions_adjustment() {
        assert_eq!(added(&lamp(), 2, 2), "Item added to cart!\n");
        assert!(added(&lamp(), 9, 5).contains("Quantity adjusted from 9 to 5"));
    }
}
