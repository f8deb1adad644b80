//! Terminal rendering.
//!
//! Data goes to stdout so it can be piped; notices and fatal errors go to
//! stderr.

use std::fmt::Display;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use tokio::task::JoinHandle;

use qkart_core::{CartItem, OrderSummary, Product};
use qkart_storefront::models::session::keys;
use qkart_storefront::models::{NoticeLevel, NoticeReceiver, Session};

/// Print notices as they arrive until every sender is dropped.
pub fn spawn_notice_printer(mut receiver: NoticeReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = receiver.recv().await {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("{}: {}", label(notice.level), notice.message);
            }
        }
    })
}

const fn label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

/// Report an error the shopper has not seen yet.
#[allow(clippy::print_stderr)]
pub fn fatal(err: &dyn Display) {
    eprintln!("error: {err}");
}

#[allow(clippy::print_stdout)]
pub fn products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for p in products {
        println!(
            "{:<18} {:<32} {:<12} ${:>8} {:>4}",
            p.id, p.name, p.category, p.cost, p.rating
        );
    }
}

/// Print one debounced search result set.
#[allow(clippy::print_stdout)]
pub fn results(query: Option<&str>, displayed: &[Product]) {
    match query {
        Some(q) => println!("-- results for {q:?} --"),
        None => println!("-- all products --"),
    }
    products(displayed);
}

#[allow(clippy::print_stdout)]
pub fn cart(items: &[CartItem], total: Decimal) {
    if items.is_empty() {
        println!("Cart is empty. Add an item to the cart and it will show up here");
        return;
    }
    for item in items {
        println!(
            "{:<18} {:<32} {:>3} x ${:>8} = ${:>9}",
            item.product_id,
            item.name,
            item.qty,
            item.cost,
            item.line_total()
        );
    }
    println!("{:>66}", format!("Order total: ${total}"));
}

#[allow(clippy::print_stdout)]
pub fn summary(summary: &OrderSummary, balance: Option<Decimal>) {
    println!("Order details");
    println!("  Products:       {}", summary.product_count);
    println!("  Subtotal:       ${}", summary.subtotal);
    println!("  Shipping:       ${}", summary.shipping);
    println!("  Total:          ${}", summary.total);

    if let Some(balance) = balance {
        println!("  Wallet balance: ${balance}");
        if !summary.is_affordable(balance) {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("warning: wallet balance is lower than the order total");
            }
        }
    }
}

/// Print the session as shell exports.
#[allow(clippy::print_stdout)]
pub fn session_exports(session: &Session) {
    let Some(user) = session.user() else {
        return;
    };
    println!(
        "export {}={}",
        keys::TOKEN,
        shell_quote(user.token.expose_secret())
    );
    println!("export {}={}", keys::USERNAME, shell_quote(&user.username));
    println!("export {}={}", keys::BALANCE, shell_quote(&user.balance.to_string()));
}

/// Single-quote `value` for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("crio.do"), "'crio.do'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_labels() {
        assert_eq!(label(NoticeLevel::Success), "ok");
        assert_eq!(label(NoticeLevel::Error), "error");
    }
}
