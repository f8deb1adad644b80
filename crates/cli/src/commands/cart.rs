//! Cart commands: `cart show`, `cart add`, `cart set`, `checkout`.

use qkart_core::ProductId;
use qkart_storefront::services::CartFlow;
use qkart_storefront::state::Storefront;

use super::{CliError, session_from_env};
use crate::output;

/// Load the catalog and the cart for the session in the environment.
async fn open(storefront: &Storefront) -> Result<CartFlow, CliError> {
    let session = session_from_env()?;
    storefront.catalog().load().await?;

    let cart = storefront.cart(session);
    cart.load().await?;
    Ok(cart)
}

pub async fn show(storefront: &Storefront) -> Result<(), CliError> {
    let cart = open(storefront).await?;
    output::cart(&cart.items(), cart.total());
    Ok(())
}

pub async fn add(storefront: &Storefront, product_id: ProductId, qty: u32) -> Result<(), CliError> {
    let cart = open(storefront).await?;
    cart.add(&product_id, qty).await?;
    output::cart(&cart.items(), cart.total());
    Ok(())
}

pub async fn set(storefront: &Storefront, product_id: ProductId, qty: u32) -> Result<(), CliError> {
    let cart = open(storefront).await?;
    cart.update_quantity(&product_id, qty).await?;
    output::cart(&cart.items(), cart.total());
    Ok(())
}

/// Print the order summary and compare it to the wallet balance.
pub async fn checkout(storefront: &Storefront) -> Result<(), CliError> {
    let cart = open(storefront).await?;
    let items = cart.items();
    let summary = cart.summary();

    output::cart(&items, summary.total);
    output::summary(&summary, cart.session().user().map(|u| u.balance));
    Ok(())
}
