//! Checkout Example
//!
//! Walks a full self-checkout trip: scan items into the cart, review the
//! running total, confirm every unit into a bag, then settle with the mock
//! payment terminal and print the receipt.
//!
//! Use `-f` to load a catalog fixture by name
//! Use `-m` to choose the payment method (counter, card, upi)
//! Use `--skip-bagging` to stop at the verification gate refusal
//! Use `--instant` to skip the scanner cooldown and terminal latency

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing_subscriber::EnvFilter;

use swiftscan::{
    catalog::Catalog,
    checkout::Session,
    fixtures,
    insights::LocalInsights,
    payment::MockTerminal,
    scanner::{ScanCooldown, Scanner},
    utils::DemoArgs,
};

/// Simulated wall clock step between scans, standing in for the shopper
/// walking between shelves.
const STEP: Duration = Duration::from_secs(3);

/// Checkout Example
pub fn main() -> Result<()> {
    let args = DemoArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog = fixtures::load_catalog(&args.fixture)?;

    let mut session = Session::new(&catalog);
    let mut scanner = if args.instant {
        Scanner::with_cooldown(&catalog, ScanCooldown::new(Duration::ZERO))
    } else {
        Scanner::new(&catalog)
    };

    let mut clock = Instant::now();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "Scanning the shelves of `{}`...", args.fixture)?;

    scan_the_shelves(&catalog, &mut session, &mut scanner, &mut clock, &mut handle)?;
    review(&mut session, &mut handle)?;

    if let Err(refusal) = session.begin_checkout() {
        writeln!(handle, "\nCheckout gate: {refusal}")?;
    }

    if args.skip_bagging {
        writeln!(handle, "Leaving the cart unbagged; no payment attempted.")?;
        return Ok(());
    }

    bag_everything(&catalog, &mut session, &mut scanner, &mut clock, &mut handle)?;

    session.begin_checkout()?;

    let terminal = if args.instant {
        MockTerminal::with_latency(Duration::ZERO)
    } else {
        MockTerminal::new()
    };

    let method = args.method.into_method()?;

    writeln!(handle, "\nSettling via {method}...")?;

    let start = Instant::now();
    let receipt = session.settle(&terminal, method)?;
    let elapsed = start.elapsed();

    receipt.write_to(&mut handle)?;

    writeln!(
        handle,
        "\nSettled in {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    session.reset();
    writeln!(handle, "Session reset; ready for the next shopper.")?;

    Ok(())
}

/// Scan one of everything, then show the scanner dropping a rapid re-read
/// and ignoring a barcode the store does not stock.
fn scan_the_shelves<'a>(
    catalog: &'a Catalog<'a>,
    session: &mut Session<'a>,
    scanner: &mut Scanner<'a>,
    clock: &mut Instant,
    out: &mut impl Write,
) -> Result<()> {
    for (_key, product) in catalog.iter() {
        *clock += STEP;

        session.start_cart_scanning()?;

        if let Some(found) = scanner.scan(product.barcode.as_str(), *clock) {
            session.record_scan(found)?;
            writeln!(out, "  + {}", product.name)?;
        } else {
            session.close_scanner()?;
        }
    }

    // A rapid re-read of the first shelf item. Inside the cooldown window
    // the scanner drops it; with `--instant` there is no window and it
    // counts as a second unit.
    if let Some((_key, first)) = catalog.iter().next() {
        session.start_cart_scanning()?;

        if let Some(found) = scanner.scan(first.barcode.as_str(), *clock) {
            session.record_scan(found)?;
            writeln!(out, "  + {} (re-read accepted)", first.name)?;
        } else {
            session.close_scanner()?;
            writeln!(out, "  . rapid re-read of {} dropped", first.name)?;
        }
    }

    // A barcode from some other store.
    *clock += STEP;
    session.start_cart_scanning()?;

    if let Some(found) = scanner.scan("999000111", *clock) {
        session.record_scan(found)?;
    } else {
        session.close_scanner()?;
        writeln!(out, "  ? 999000111 is not stocked here")?;
    }

    Ok(())
}

/// Print the cart position and the shopping insight for the trip.
fn review(session: &mut Session<'_>, out: &mut impl Write) -> Result<()> {
    let verification = session.verification();

    writeln!(
        out,
        "\nIn the cart: {} unit(s) across {} line(s), {} still to bag",
        verification.total_cart,
        session.cart().len(),
        verification.remaining
    )?;

    let totals = session.totals()?;

    writeln!(
        out,
        "Running total: {} ({} after tax)",
        totals.subtotal, totals.total
    )?;

    if let Some(insight) = session.refresh_insights(&LocalInsights) {
        writeln!(out, "\nWhile you shop:")?;
        writeln!(out, "  Recipe idea: {}", insight.recipe_suggestion)?;
        writeln!(out, "  Estimated calories: {}", insight.total_calories)?;
        writeln!(out, "  Saving tip: {}", insight.saving_tips)?;
    }

    Ok(())
}

/// Confirm every outstanding unit into a bag, one scan per unit.
fn bag_everything<'a>(
    catalog: &'a Catalog<'a>,
    session: &mut Session<'a>,
    scanner: &mut Scanner<'a>,
    clock: &mut Instant,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "\nBagging...")?;

    let pending: Vec<(String, String, u32)> = session
        .cart()
        .iter()
        .filter_map(|line| {
            catalog.product(line.product()).map(|product| {
                (
                    product.name.clone(),
                    product.barcode.as_str().to_owned(),
                    line.outstanding(),
                )
            })
        })
        .collect();

    for (name, barcode, outstanding) in pending {
        for _ in 0..outstanding {
            *clock += STEP;
            session.start_bag_scanning()?;

            if let Some(found) = scanner.scan(&barcode, *clock) {
                session.record_scan(found)?;
            } else {
                session.close_scanner()?;
            }
        }

        writeln!(out, "  bagged {outstanding} x {name}")?;
    }

    Ok(())
}
