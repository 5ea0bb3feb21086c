//! Payment
//!
//! Mocked payment flow. Methods mirror a two-level kiosk choice: settle
//! inside the app with a card or UPI address, or pay in cash at the counter.
//! No real processing happens anywhere here.

use std::{fmt, thread, time::Duration};

use rand::{RngCore, rngs::OsRng};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

/// Stock settlement latency of the mock terminal.
const SETTLEMENT_LATENCY: Duration = Duration::from_millis(2500);

/// Errors raised while capturing payment details or settling a charge.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The card number contained no digits.
    #[error("card number must not be empty")]
    EmptyCardNumber,

    /// The UPI id was empty.
    #[error("UPI id must not be empty")]
    EmptyUpiId,

    /// The terminal declined the charge.
    #[error("payment declined: {0}")]
    Declined(String),
}

/// Card details captured by the in-app form.
///
/// The number is normalised to digits on construction. Expiry and CVV are
/// carried for display but do not gate the charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    expiry: Option<String>,
    cvv: Option<String>,
}

impl CardDetails {
    /// Normalise and validate a card number.
    ///
    /// Spaces and separators are dropped; at least one digit must remain.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::EmptyCardNumber`] if no digits remain.
    pub fn new(number: &str) -> Result<Self, PaymentError> {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(PaymentError::EmptyCardNumber);
        }

        Ok(CardDetails {
            number: digits,
            expiry: None,
            cvv: None,
        })
    }

    /// Attach an expiry in `MM/YY` form.
    #[must_use]
    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Attach a CVV.
    #[must_use]
    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }

    /// The trailing digits of the number, for masked display.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let split = self.number.len().saturating_sub(4);

        self.number.get(split..).unwrap_or(&self.number)
    }
}

/// A UPI payment address, for example `name@bank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpiId(String);

impl UpiId {
    /// Validate a UPI id.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::EmptyUpiId`] if the trimmed id is empty.
    pub fn new(id: &str) -> Result<Self, PaymentError> {
        let id = id.trim();

        if id.is_empty() {
            return Err(PaymentError::EmptyUpiId);
        }

        Ok(UpiId(id.to_owned()))
    }

    /// The id as entered, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How an in-app payment is funded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InAppMethod {
    /// Debit or credit card.
    Card(CardDetails),

    /// UPI transfer.
    Upi(UpiId),
}

impl fmt::Display for InAppMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InAppMethod::Card(card) => write!(f, "card ending {}", card.last_four()),
            InAppMethod::Upi(id) => write!(f, "UPI {}", id.as_str()),
        }
    }
}

/// Payment route chosen at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Settle inside the app.
    InApp(InAppMethod),

    /// Settle in cash at the counter.
    Counter,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::InApp(method) => write!(f, "In-app, {method}"),
            PaymentMethod::Counter => write!(f, "Pay at counter"),
        }
    }
}

/// Terminal-issued reference in `SS-nnn-nnnn` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReference(String);

impl TransactionReference {
    /// Generate a reference like `SS-882-9901`.
    #[must_use]
    pub fn generate(rng: &mut impl RngCore) -> Self {
        let prefix = 100 + rng.next_u32() % 900;
        let suffix = 1000 + rng.next_u32() % 9000;

        TransactionReference(format!("SS-{prefix}-{suffix}"))
    }

    /// The reference as printed on a receipt.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof of settlement returned by a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    reference: TransactionReference,
}

impl PaymentConfirmation {
    /// Wrap a terminal reference.
    #[must_use]
    pub fn new(reference: TransactionReference) -> Self {
        PaymentConfirmation { reference }
    }

    /// The transaction reference.
    #[must_use]
    pub fn reference(&self) -> &TransactionReference {
        &self.reference
    }
}

/// A device or service that can settle a charge.
pub trait PaymentTerminal {
    /// Charge `amount` using `method`.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if the terminal declines or fails.
    fn process(
        &self,
        amount: &Money<'_, Currency>,
        method: &PaymentMethod,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

/// Terminal that approves every charge after a simulated settlement delay.
#[derive(Debug, Clone, Copy)]
pub struct MockTerminal {
    latency: Duration,
}

impl MockTerminal {
    /// A terminal with the stock settlement latency.
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency(SETTLEMENT_LATENCY)
    }

    /// A terminal that settles after `latency`. Tests pass
    /// [`Duration::ZERO`].
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        MockTerminal { latency }
    }
}

impl Default for MockTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentTerminal for MockTerminal {
    fn process(
        &self,
        amount: &Money<'_, Currency>,
        method: &PaymentMethod,
    ) -> Result<PaymentConfirmation, PaymentError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        let confirmation = PaymentConfirmation::new(TransactionReference::generate(&mut OsRng));

        info!(
            amount = %amount,
            method = %method,
            reference = %confirmation.reference(),
            "settled payment"
        );

        Ok(confirmation)
    }
}
