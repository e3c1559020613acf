//! Login and logout.

use marketplace_core::Email;
use marketplace_storefront::Storefront;
use secrecy::SecretString;
use tracing::info;

use super::{CliError, page};
use crate::{telemetry, views};

/// Log in and show the confirmation with the loaded cart badge.
///
/// # Errors
///
/// Returns `CliError::Login` with the message to show on the login form.
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: &SecretString,
) -> Result<String, CliError> {
    let user = storefront.login(email, password).await?;

    telemetry::set_sentry_user(&user.id, user.email.as_ref().map(Email::as_str));
    info!(user_id = %user.id, "Login succeeded");

    Ok(page(storefront, &views::login::success(&user)))
}

/// Log out and show the login form.
///
/// # Errors
///
/// Returns an error if the session file cannot be updated.
pub async fn logout(storefront: &Storefront) -> Result<String, CliError> {
    storefront.logout().await?;
    telemetry::clear_sentry_user();

    Ok(views::login::logged_out())
}
