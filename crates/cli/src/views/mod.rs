//! Text renderers for each page.
//!
//! Views are pure functions from storefront data to a `String`; commands
//! decide what to fetch and where the output goes.

pub mod cart;
pub mod login;
pub mod navbar;
pub mod product_detail;
pub mod products;

use std::fmt::Write;

/// Placeholder shown instead of a missing product image.
pub const IMAGE_PLACEHOLDER: &str = "Image not available";

/// Maximum description length on the product grid.
const EXCERPT_CHARS: usize = 100;

/// One star per whole rating point.
pub fn stars(rating: f64) -> String {
    let count = (1..=5_u8).filter(|n| f64::from(*n) <= rating).count();
    "⭐".repeat(count)
}

/// `⭐⭐⭐⭐ 4.5 (12 reviews)`
pub fn rating_line(rating: f64, review_count: i64) -> String {
    let stars = stars(rating);
    if stars.is_empty() {
        format!("{rating:.1} ({review_count} reviews)")
    } else {
        format!("{stars} {rating:.1} ({review_count} reviews)")
    }
}

/// First 100 characters of `text`, with `...` when cut.
pub fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let mut short: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        short.push_str("...");
    }
    short
}

/// Title underlined with `=`.
pub fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

/// Full page: navbar (when logged in) above the body.
pub fn page(navbar: Option<&str>, body: &str) -> String {
    let mut out = String::new();
    if let Some(navbar) = navbar {
        let _ = writeln!(out, "{navbar}");
        let _ = writeln!(out, "{}", "-".repeat(navbar.chars().count()));
        out.push('\n');
    }
    out.push_str(body.trim_end());
    out
}
