//! Account commands: `login`, `register`.

use qkart_storefront::services::{LoginForm, RegisterForm};
use qkart_storefront::state::Storefront;

use super::CliError;
use crate::output;

/// Log in and print the session as `export` lines for `eval`.
pub async fn login(
    storefront: &Storefront,
    username: String,
    password: String,
) -> Result<(), CliError> {
    let form = LoginForm::new(username, password);
    let session = storefront.auth().login(&form).await?;
    output::session_exports(&session);
    Ok(())
}

pub async fn register(
    storefront: &Storefront,
    username: String,
    password: String,
    confirm: String,
) -> Result<(), CliError> {
    let form = RegisterForm::new(username, password, confirm);
    storefront.auth().register(&form).await?;
    Ok(())
}
