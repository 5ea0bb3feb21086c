//! Scanner
//!
//! Emulates the continuous detection feed of a camera-based barcode scanner.
//! A code in frame is reported many times per second, so accepted reads arm
//! a cooldown that swallows the repeats. Manual code entry bypasses this
//! module entirely and resolves against the catalog directly.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{catalog::Catalog, products::ProductKey};

/// Window during which repeat detections are ignored.
const DEFAULT_COOLDOWN: Duration = Duration::from_millis(2000);

/// Debounce for a continuous detection feed.
///
/// Only an accepted detection arms the window, so a stream of unknown codes
/// never blocks a following valid read. Time is injected by the caller to
/// keep the type pure.
#[derive(Debug, Clone, Copy)]
pub struct ScanCooldown {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl ScanCooldown {
    /// A cooldown with a custom window. [`Duration::ZERO`] disables
    /// suppression.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        ScanCooldown {
            window,
            last_accepted: None,
        }
    }

    /// Whether a detection at `at` falls inside the suppression window.
    #[must_use]
    pub fn is_suppressed(&self, at: Instant) -> bool {
        self.last_accepted
            .is_some_and(|last| at.duration_since(last) < self.window)
    }

    /// Arm the window. Called only once a detection has resolved to a
    /// product.
    pub fn mark_accepted(&mut self, at: Instant) {
        self.last_accepted = Some(at);
    }
}

impl Default for ScanCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

/// A barcode scanner bound to a catalog.
#[derive(Debug)]
pub struct Scanner<'a> {
    catalog: &'a Catalog<'a>,
    cooldown: ScanCooldown,
}

impl<'a> Scanner<'a> {
    /// A scanner with the default two second cooldown.
    #[must_use]
    pub fn new(catalog: &'a Catalog<'a>) -> Self {
        Self::with_cooldown(catalog, ScanCooldown::default())
    }

    /// A scanner with a caller-supplied cooldown.
    #[must_use]
    pub fn with_cooldown(catalog: &'a Catalog<'a>, cooldown: ScanCooldown) -> Self {
        Scanner { catalog, cooldown }
    }

    /// Process one detection from the feed.
    ///
    /// Returns the resolved product, or `None` when the read is suppressed
    /// by the cooldown or the code is not in the catalog. Neither case is an
    /// error; both are logged.
    pub fn scan(&mut self, raw_code: &str, at: Instant) -> Option<ProductKey> {
        if self.cooldown.is_suppressed(at) {
            debug!(code = raw_code, "suppressed repeat detection inside cooldown window");
            return None;
        }

        match self.catalog.resolve_barcode(raw_code) {
            Some(key) => {
                self.cooldown.mark_accepted(at);
                debug!(code = raw_code, "resolved barcode");

                Some(key)
            }
            None => {
                warn!(code = raw_code, "barcode did not match any catalog product");

                None
            }
        }
    }

    /// The catalog this scanner resolves against.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog<'a> {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};

    use crate::products::{Barcode, Product};

    use super::*;

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

    #[test]
    fn repeat_detection_inside_window_is_suppressed() {
        let catalog = catalog();
        let mut scanner = Scanner::new(&catalog);
        let start = Instant::now();

        assert!(scanner.scan("400123456", start).is_some());
        assert!(
            scanner.scan("400123456", start + Duration::from_millis(500)).is_none(),
            "read half a second after an accepted one must be swallowed"
        );
    }

    #[test]
    fn detection_after_window_is_accepted() {
        let catalog = catalog();
        let mut scanner = Scanner::new(&catalog);
        let start = Instant::now();

        assert!(scanner.scan("400123456", start).is_some());
        assert!(
            scanner
                .scan("400123456", start + Duration::from_millis(2500))
                .is_some()
        );
    }

    #[test]
    fn cooldown_applies_across_different_codes() {
        let catalog = catalog();
        let mut scanner = Scanner::new(&catalog);
        let start = Instant::now();

        assert!(scanner.scan("400123456", start).is_some());
        assert!(
            scanner.scan("400987654", start + Duration::from_millis(500)).is_none(),
            "the window follows the feed, not the individual code"
        );
    }

    #[test]
    fn unknown_code_does_not_arm_the_cooldown() {
        let catalog = catalog();
        let mut scanner = Scanner::new(&catalog);
        let start = Instant::now();

        assert!(scanner.scan("999000111", start).is_none());
        assert!(
            scanner.scan("400123456", start + Duration::from_millis(10)).is_some(),
            "a miss must not block the next valid read"
        );
    }

    #[test]
    fn zero_window_never_suppresses() {
        let catalog = catalog();
        let mut scanner = Scanner::with_cooldown(&catalog, ScanCooldown::new(Duration::ZERO));
        let at = Instant::now();

        assert!(scanner.scan("400123456", at).is_some());
        assert!(scanner.scan("400123456", at).is_some());
    }
}
