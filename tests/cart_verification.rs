//! Integration test for cart and bag reconciliation.
//!
//! The running example is a small dairy run:
//!
//! 1. Organic Milk 1L at $4.50, scanned into the cart twice -> $9.00
//! 2. Fresh Bananas (Bunch) at $2.20, scanned once -> $2.20
//!
//! Subtotal: $11.20 (1120 cents)
//! Tax at 5%: $0.56 (56 cents)
//! Total: $11.76 (1176 cents)
//!
//! Bagging confirms units one at a time. The cart is verified only when the
//! bagged tally equals the cart tally exactly; extra bag scans clamp at the
//! cart quantity instead of overshooting.

use rusty_money::{
    Money,
    iso::{Currency, USD},
};
use testresult::TestResult;

use swiftscan::{
    cart::Cart,
    catalog::Catalog,
    pricing::{TaxRate, checkout_totals},
    products::{Barcode, Product, ProductKey},
};

fn catalog() -> Catalog<'static> {
    let mut catalog = Catalog::new(USD);

    catalog
        .insert(Product {
            name: "Organic Milk 1L".into(),
            category: "Dairy".into(),
            barcode: Barcode::new("400123456"),
            image_url: None,
            price: Money::from_minor(450, USD),
        })
        .expect("product should insert");

    catalog
        .insert(Product {
            name: "Fresh Bananas (Bunch)".into(),
            category: "Produce".into(),
            barcode: Barcode::new("400987654"),
            image_url: None,
            price: Money::from_minor(220, USD),
        })
        .expect("product should insert");

    catalog
}

fn price(catalog: &Catalog<'static>, key: ProductKey) -> Money<'static, Currency> {
    catalog
        .product(key)
        .map(|product| product.price)
        .expect("product should exist")
}

#[test]
fn cart_and_bag_tallies_reconcile_unit_by_unit() -> TestResult {
    let catalog = catalog();
    let milk = catalog.resolve_barcode("400123456").expect("known barcode");
    let bananas = catalog.resolve_barcode("400987654").expect("known barcode");

    let mut cart = Cart::new(catalog.currency());

    // Three units in: two milk, one bananas.
    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_cart_scan(bananas, price(&catalog, bananas));

    let before = cart.verification();

    assert_eq!(before.total_cart, 3);
    assert_eq!(before.total_bagged, 0);
    assert_eq!(before.remaining, 3);
    assert!(!before.is_verified);

    // Confirm them into bags one at a time; remaining counts down.
    cart.record_bag_scan(milk);
    assert_eq!(cart.verification().remaining, 2);

    cart.record_bag_scan(bananas);
    assert_eq!(cart.verification().remaining, 1);

    cart.record_bag_scan(milk);

    let after = cart.verification();

    assert_eq!(after.remaining, 0);
    assert!(after.is_verified, "all units bagged must verify the cart");

    Ok(())
}

#[test]
fn bag_scans_clamp_at_the_cart_quantity() -> TestResult {
    let catalog = catalog();
    let milk = catalog.resolve_barcode("400123456").expect("known barcode");

    let mut cart = Cart::new(catalog.currency());

    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_bag_scan(milk);

    // A duplicate bag scan must not push bagged past cart.
    cart.record_bag_scan(milk);

    let line = cart.lines().first().expect("cart should have a milk line");

    assert_eq!(line.cart_quantity(), 1);
    assert_eq!(line.bagged_quantity(), 1);
    assert!(cart.verification().is_verified);

    Ok(())
}

#[test]
fn bag_scan_without_a_cart_scan_is_ignored() -> TestResult {
    let catalog = catalog();
    let milk = catalog.resolve_barcode("400123456").expect("known barcode");
    let bananas = catalog.resolve_barcode("400987654").expect("known barcode");

    let mut cart = Cart::new(catalog.currency());

    cart.record_cart_scan(milk, price(&catalog, milk));

    // Bananas were never scanned into the cart, so nothing to confirm.
    cart.record_bag_scan(bananas);

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.verification().total_bagged, 0);

    Ok(())
}

#[test]
fn totals_follow_the_worked_example() -> TestResult {
    let catalog = catalog();
    let milk = catalog.resolve_barcode("400123456").expect("known barcode");
    let bananas = catalog.resolve_barcode("400987654").expect("known barcode");

    let mut cart = Cart::new(catalog.currency());

    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_cart_scan(bananas, price(&catalog, bananas));

    let totals = checkout_totals(&cart, TaxRate::standard())?;

    assert_eq!(totals.subtotal, Money::from_minor(1120, USD));
    assert_eq!(totals.tax, Money::from_minor(56, USD));
    assert_eq!(totals.total, Money::from_minor(1176, USD));

    Ok(())
}

#[test]
fn billing_follows_the_cart_tally_not_the_bag_tally() -> TestResult {
    let catalog = catalog();
    let milk = catalog.resolve_barcode("400123456").expect("known barcode");

    let mut cart = Cart::new(catalog.currency());

    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_cart_scan(milk, price(&catalog, milk));
    cart.record_bag_scan(milk);

    // One of two units bagged; the charge still covers both.
    assert_eq!(cart.subtotal()?, Money::from_minor(900, USD));

    Ok(())
}

#[test]
fn empty_cart_never_verifies() -> TestResult {
    let catalog = catalog();
    let cart = Cart::new(catalog.currency());

    let verification = cart.verification();

    assert_eq!(verification.total_cart, 0);
    assert_eq!(verification.remaining, 0);
    assert!(
        !verification.is_verified,
        "an empty cart must not count as verified"
    );
    assert_eq!(cart.subtotal()?, Money::from_minor(0, USD));

    Ok(())
}
