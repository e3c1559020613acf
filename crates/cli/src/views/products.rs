//! Product grid.

use std::fmt::Write;

use marketplace_storefront::Product;

use super::{IMAGE_PLACEHOLDER, excerpt, heading, rating_line};

/// Render the product list.
pub fn render(products: &[Product]) -> String {
    let mut out = heading("Products");

    if products.is_empty() {
        out.push_str("\nNo products available\n");
        return out;
    }

    for product in products {
        out.push('\n');
        let _ = writeln!(out, "{}  [{}]", product.name, product.id);
        let _ = writeln!(out, "  {}", product.primary_image().unwrap_or(IMAGE_PLACEHOLDER));
        if !product.description.is_empty() {
            let _ = writeln!(out, "  {}", excerpt(&product.description));
        }
        let _ = writeln!(out, "  {}", rating_line(product.rating, product.review_count));
        let stock = if product.in_stock() {
            "In Stock"
        } else {
            "Out of Stock"
        };
        let _ = writeln!(out, "  {}  {stock}", product.price);
    }

    out.push_str("\nView a product with `mp product <id>`.\n");
    out
}
