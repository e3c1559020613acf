//! Login page.

use std::fmt::Write;

use marketplace_storefront::User;

use super::heading;

/// The login form, with the error from a previous attempt if any.
pub fn form(error: Option<&str>) -> String {
    let mut out = heading("Login");
    if let Some(error) = error {
        let _ = writeln!(out, "\n{error}");
    }
    out.push_str(
        "\nEmail:    mp login --email <email>\n\
         Password: --password <password> (or set MARKETPLACE_PASSWORD)\n",
    );
    out
}

/// Confirmation after a successful login.
pub fn success(user: &User) -> String {
    format!(
        "Logged in as {}.\n\nBrowse products with `mp products`.",
        user.display_name()
    )
}

/// Confirmation after logout, followed by the login form.
pub fn logged_out() -> String {
    format!("Logged out.\n\n{}", form(None))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_shows_error_text() {
        let page = form(Some("Login failed. Please check your credentials."));
        assert!(page.starts_with("Login\n=====\n"));
        assert!(page.contains("Login failed. Please check your credentials."));
    }

    #[test]
    fn test_success_names_user() {
        let user: User =
            serde_json::from_str(r#"{"id": "u1", "email": "john.doe@example.com"}"#).unwrap();
        assert!(success(&user).starts_with("Logged in as john.doe@example.com."));
    }
}
