//! Cart page.

use std::fmt::Write;

use marketplace_storefront::CartState;

use super::{IMAGE_PLACEHOLDER, heading};

/// Render the cart with its order summary.
pub fn render(state: &CartState) -> String {
    let mut out = heading("Your Cart");

    if state.loading {
        out.push_str("\nLoading cart...\n");
        return out;
    }

    if state.is_empty() {
        out.push_str("\nYour cart is empty\n\nContinue shopping with `mp products`.\n");
        return out;
    }

    for item in &state.items {
        let id = &item.product_id;
        out.push('\n');
        let _ = writeln!(out, "{}  [{id}]", item.name());
        let _ = writeln!(out, "  {}", item.primary_image().unwrap_or(IMAGE_PLACEHOLDER));
        let _ = writeln!(
            out,
            "  {} x {} = {}",
            item.unit_price(),
            item.quantity,
            item.line_total()
        );

        let decrement = if item.can_decrement() {
            format!("mp cart dec {id}")
        } else {
            "(minimum)".to_string()
        };
        let increment = if item.can_increment() {
            format!("mp cart inc {id}")
        } else {
            "(stock limit)".to_string()
        };
        let _ = writeln!(out, "  [-] {decrement}   [+] {increment}   [remove] mp cart remove {id}");
    }

    out.push('\n');
    out.push_str(&heading("Order Summary"));
    let _ = writeln!(out, "Subtotal  {}", state.subtotal);
    let _ = writeln!(out, "Total     {}", state.total());
    out
}

/// Note shown when a quantity control cannot move.
pub fn unchanged(reason: &str, state: &CartState) -> String {
    format!("{reason}\n\n{}", render(state))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use marketplace_storefront::api::CartSnapshot;

    fn state(json: &str) -> CartState {
        CartState::from(serde_json::from_str::<CartSnapshot>(json).unwrap())
    }

    #[test]
    fn test_empty_cart() {
        let page = render(&CartState::default());
        assert!(page.contains("Your cart is empty"));
        assert!(!page.contains("Order Summary"));
    }

    #[test]
    fn test_lines_and_summary() {
        let page = render(&state(
            r#"{"items": [
                {"id": "c1", "productId": "p1", "quantity": 2,
                 "product": {"id": "p1", "name": "Desk Lamp", "price": 49.99, "images": [], "stock": 2}},
                {"id": "c2", "productId": "p2", "quantity": 1,
                 "product": {"id": "p2", "name": "Mug", "price": 8, "images": ["mug.jpg"], "stock": 10}}
            ], "subtotal": 107.98}"#,
        ));

        assert!(page.contains("Desk Lamp  [p1]"));
        assert!(page.contains("$49.99 x 2 = $99.98"));
        assert!(page.contains("[-] mp cart dec p1   [+] (stock limit)"));
        assert!(page.contains("[-] (minimum)   [+] mp cart inc p2"));
        assert!(page.contains("Subtotal  $107.98"));
        assert!(page.contains("Total     $107.98"));
    }

    #[test]
    fn test_line_without_product_snapshot() {
        let page = render(&state(
            r#"{"items": [{"id": "c1", "productId": "gone", "quantity": 1}], "subtotal": 0}"#,
        ));
        assert!(page.contains("Product  [gone]"));
        assert!(page.contains("$0.00 x 1 = $0.00"));
    }
}
