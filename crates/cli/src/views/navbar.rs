//! Navigation bar.

use marketplace_storefront::User;

/// Brand shown at the left of the navbar.
pub const BRAND: &str = "Marketplace";

/// Render the navbar for a logged-in user.
///
/// The cart badge only appears when the cart has lines.
pub fn render(user: Option<&User>, item_count: usize) -> String {
    let badge = if item_count > 0 {
        format!(" ({item_count})")
    } else {
        String::new()
    };

    let account = user.map_or_else(
        || "Logout".to_string(),
        |user| format!("{} | Logout", user.display_name()),
    );

    format!("{BRAND}    Products | Cart{badge} | {account}")
}
