//! Catalog commands: `products`, `search`, `browse`.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

use qkart_storefront::state::Storefront;

use super::CliError;
use crate::output;

/// Print the full catalog.
pub async fn products(storefront: &Storefront) -> Result<(), CliError> {
    storefront.catalog().load().await?;
    output::products(&storefront.catalog().displayed());
    Ok(())
}

/// Run one search and print the matches.
///
/// The catalog is loaded first so a failed search can fall back to it.
pub async fn search(storefront: &Storefront, query: &str) -> Result<(), CliError> {
    let catalog = storefront.catalog();
    catalog.load().await?;
    catalog.search(query).await?;
    output::products(&catalog.displayed());
    Ok(())
}

/// Feed stdin lines to the search box and print each result set.
pub async fn browse(storefront: &Storefront) -> Result<(), CliError> {
    let catalog = storefront.catalog();
    if catalog.load().await.is_err() {
        // Already shown as a notice; searching still works without it.
        tracing::debug!("Browsing without a catalog");
    }
    output::products(&catalog.displayed());

    let mut changes = catalog.subscribe();
    let (done_tx, mut done_rx) = oneshot::channel::<()>();
    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = changes.borrow_and_update().clone();
                    output::results(snapshot.query.as_deref(), &snapshot.displayed);
                }
                _ = &mut done_rx => {
                    if changes.has_changed().unwrap_or(false) {
                        let snapshot = changes.borrow_and_update().clone();
                        output::results(snapshot.query.as_deref(), &snapshot.displayed);
                    }
                    break;
                }
            }
        }
    });

    let mut search_box = storefront.search_box();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        search_box.on_keystroke(&line);
    }

    // Wait for the last search to fire and land, including one already in flight.
    let wait = storefront.config().search_debounce + storefront.config().backend.request_timeout;
    if tokio::time::timeout(wait, search_box.settle()).await.is_err() {
        tracing::warn!("Last search did not complete in time");
    }

    // The printer may already have exited if the catalog went away.
    let _ = done_tx.send(());
    if let Err(err) = printer.await {
        tracing::debug!(error = %err, "Result printer stopped");
    }
    Ok(())
}
