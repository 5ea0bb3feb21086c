//! Checkout
//!
//! The session state machine for a single self-checkout trip. All mutation
//! goes through [`Session`], one operation at a time; derived values are
//! recomputed on demand so there is no cached state to fall out of sync.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, Verification},
    catalog::Catalog,
    insights::{InsightItem, InsightSource, ShoppingInsight},
    payment::{PaymentError, PaymentMethod, PaymentTerminal},
    pricing::{CheckoutTotals, PricingError, TaxRate, checkout_totals},
    products::ProductKey,
    receipt::{Receipt, ReceiptError},
};

/// Errors from session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not valid in the current stage.
    #[error("operation not available while {0}")]
    WrongStage(Stage),

    /// Checkout was requested with nothing in the cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Checkout was requested before every unit was bagged.
    #[error("{remaining} unit(s) still need a bag scan")]
    VerificationPending {
        /// Units that still need a bag scan.
        remaining: u32,
    },

    /// Pricing failed while preparing the charge.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The terminal refused or failed the charge.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The receipt could not be built.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

/// Where the shopper is in the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Walking the aisles; the cart view is closed.
    Browsing,

    /// The scanner sheet is open to add items to the cart.
    ScanningCart,

    /// Looking at the cart contents.
    Reviewing,

    /// The scanner sheet is open to confirm items into bags.
    ScanningBag,

    /// Committed to paying; capturing the payment method.
    Paying,

    /// Payment settled; the receipt is available.
    Completed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Browsing => "browsing",
            Stage::ScanningCart => "scanning to cart",
            Stage::Reviewing => "reviewing the cart",
            Stage::ScanningBag => "scanning to bag",
            Stage::Paying => "paying",
            Stage::Completed => "completed",
        };

        f.write_str(label)
    }
}

/// A single shopper's self-checkout session.
///
/// Owns the cart, borrows the catalog, and is the one logical writer for the
/// whole trip. Checkout is reachable only through [`Session::begin_checkout`],
/// which enforces the bag-verification gate; there is no other path to
/// [`Stage::Paying`].
#[derive(Debug)]
pub struct Session<'a> {
    catalog: &'a Catalog<'a>,
    cart: Cart<'a>,
    stage: Stage,
    tax_rate: TaxRate,
    insight: Option<ShoppingInsight>,
    receipt: Option<Receipt<'a>>,
}

impl<'a> Session<'a> {
    /// Start a fresh session against a catalog, at the standard tax rate.
    #[must_use]
    pub fn new(catalog: &'a Catalog<'a>) -> Self {
        Self::with_tax_rate(catalog, TaxRate::standard())
    }

    /// Start a fresh session with a caller-supplied tax rate.
    #[must_use]
    pub fn with_tax_rate(catalog: &'a Catalog<'a>, tax_rate: TaxRate) -> Self {
        Session {
            catalog,
            cart: Cart::new(catalog.currency()),
            stage: Stage::Browsing,
            tax_rate,
            insight: None,
            receipt: None,
        }
    }

    /// Current stage of the trip.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The cart being reconciled.
    #[must_use]
    pub fn cart(&self) -> &Cart<'a> {
        &self.cart
    }

    /// The catalog this session resolves against.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog<'a> {
        self.catalog
    }

    /// Check cart totals against bagged totals.
    #[must_use]
    pub fn verification(&self) -> Verification {
        self.cart.verification()
    }

    /// Subtotal, tax and total as they would be charged right now.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the cart cannot be priced.
    pub fn totals(&self) -> Result<CheckoutTotals<'a>, PricingError> {
        checkout_totals(&self.cart, self.tax_rate)
    }

    /// The cached shopping insight, if one has been fetched this session.
    #[must_use]
    pub fn insight(&self) -> Option<&ShoppingInsight> {
        self.insight.as_ref()
    }

    /// The receipt of a completed trip.
    #[must_use]
    pub fn receipt(&self) -> Option<&Receipt<'a>> {
        self.receipt.as_ref()
    }

    /// Open the scanner sheet to add items to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongStage`] unless browsing or reviewing.
    pub fn start_cart_scanning(&mut self) -> Result<(), SessionError> {
        match self.stage {
            Stage::Browsing | Stage::Reviewing => {
                self.stage = Stage::ScanningCart;
                Ok(())
            }
            stage => Err(SessionError::WrongStage(stage)),
        }
    }

    /// Open the scanner sheet to confirm items into bags.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongStage`] unless reviewing.
    pub fn start_bag_scanning(&mut self) -> Result<(), SessionError> {
        match self.stage {
            Stage::Reviewing => {
                self.stage = Stage::ScanningBag;
                Ok(())
            }
            stage => Err(SessionError::WrongStage(stage)),
        }
    }

    /// Apply a resolved scan to the session.
    ///
    /// While scanning to cart, the product is added at its catalog price;
    /// while scanning to bags, one unit is confirmed. Keys that do not
    /// resolve are logged and ignored rather than failing the scan. The
    /// scanner sheet closes after every read, landing back on review.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongStage`] outside the two scanning stages.
    pub fn record_scan(&mut self, product: ProductKey) -> Result<(), SessionError> {
        match self.stage {
            Stage::ScanningCart => {
                if let Some(found) = self.catalog.product(product) {
                    self.cart.record_cart_scan(product, found.price);
                    debug!(product = %found.name, "recorded cart scan");
                } else {
                    warn!("cart scan ignored, key does not resolve in the catalog");
                }

                self.stage = Stage::Reviewing;
                Ok(())
            }
            Stage::ScanningBag => {
                self.cart.record_bag_scan(product);
                self.stage = Stage::Reviewing;
                Ok(())
            }
            stage => Err(SessionError::WrongStage(stage)),
        }
    }

    /// Close the scanner sheet without recording anything.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongStage`] outside the two scanning stages.
    pub fn close_scanner(&mut self) -> Result<(), SessionError> {
        match self.stage {
            Stage::ScanningCart | Stage::ScanningBag => {
                self.stage = Stage::Reviewing;
                Ok(())
            }
            stage => Err(SessionError::WrongStage(stage)),
        }
    }

    /// Commit to paying.
    ///
    /// This is the verification gate: it refuses an empty cart and refuses a
    /// cart with units still awaiting a bag scan. Passing it is the only way
    /// to reach [`Stage::Paying`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongStage`] unless reviewing.
    /// - [`SessionError::EmptyCart`] when nothing has been scanned.
    /// - [`SessionError::VerificationPending`] when bagging is incomplete.
    pub fn begin_checkout(&mut self) -> Result<(), SessionError> {
        if self.stage != Stage::Reviewing {
            return Err(SessionError::WrongStage(self.stage));
        }

        if self.cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }

        let verification = self.cart.verification();

        if !verification.is_verified {
            return Err(SessionError::VerificationPending {
                remaining: verification.remaining,
            });
        }

        self.stage = Stage::Paying;
        Ok(())
    }

    /// Back out of payment to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongStage`] unless paying.
    pub fn cancel_checkout(&mut self) -> Result<(), SessionError> {
        match self.stage {
            Stage::Paying => {
                self.stage = Stage::Reviewing;
                Ok(())
            }
            stage => Err(SessionError::WrongStage(stage)),
        }
    }

    /// Charge the tax-inclusive total and finish the trip.
    ///
    /// On success the session holds the receipt and moves to
    /// [`Stage::Completed`]. On any failure the session stays in
    /// [`Stage::Paying`] so the shopper can retry or back out.
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongStage`] unless paying.
    /// - [`SessionError::Pricing`] if the cart cannot be priced.
    /// - [`SessionError::Payment`] if the terminal declines or fails.
    /// - [`SessionError::Receipt`] if the receipt cannot be built.
    pub fn settle<T>(
        &mut self,
        terminal: &T,
        method: PaymentMethod,
    ) -> Result<&Receipt<'a>, SessionError>
    where
        T: PaymentTerminal + ?Sized,
    {
        if self.stage != Stage::Paying {
            return Err(SessionError::WrongStage(self.stage));
        }

        let totals = checkout_totals(&self.cart, self.tax_rate)?;
        let confirmation = terminal.process(&totals.total, &method)?;

        let receipt = Receipt::new(
            &self.cart,
            self.catalog,
            totals,
            self.tax_rate,
            method,
            confirmation,
        )?;

        info!(total = %receipt.total(), reference = %receipt.reference(), "completed checkout");

        self.stage = Stage::Completed;
        Ok(&*self.receipt.insert(receipt))
    }

    /// Fetch shopping insights for the current cart, once.
    ///
    /// Runs only while reviewing a non-empty cart with nothing cached; every
    /// other call returns whatever is already there. A source failure is
    /// logged and leaves the session without an insight; it never interrupts
    /// the trip.
    pub fn refresh_insights<S>(&mut self, source: &S) -> Option<&ShoppingInsight>
    where
        S: InsightSource + ?Sized,
    {
        if self.stage != Stage::Reviewing || self.cart.is_empty() {
            return self.insight.as_ref();
        }

        if self.insight.is_none() {
            let items = InsightItem::from_cart(&self.cart, self.catalog);

            match source.shopping_insights(&items) {
                Ok(insight) => self.insight = Some(insight),
                Err(error) => warn!("shopping insights unavailable: {error}"),
            }
        }

        self.insight.as_ref()
    }

    /// Abandon or finish the trip and return to browsing.
    ///
    /// The cart, the cached insight and any receipt are discarded; every
    /// derived value afterwards matches a freshly constructed session.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.insight = None;
        self.receipt = None;
        self.stage = Stage::Browsing;
    }
}
