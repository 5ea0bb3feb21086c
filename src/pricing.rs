//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::{Cart, LineItem};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A quantity or percentage calculation could not be represented in minor units.
    #[error("amount could not be represented in minor units")]
    AmountConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Sales tax rate applied to the cart subtotal at checkout.
#[derive(Debug, Clone, Copy)]
pub struct TaxRate(Percentage);

impl TaxRate {
    /// The flat rate used when no override is configured.
    #[must_use]
    pub fn standard() -> Self {
        TaxRate(Percentage::from(0.05))
    }

    /// A rate from a fraction, where `0.05` means five percent.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        TaxRate(Percentage::from(fraction))
    }

    /// Tax due on an amount, rounded half away from zero to the nearest
    /// minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountConversion`] if the percentage
    /// calculation overflows or cannot be represented in minor units.
    pub fn tax_on<'a>(
        &self,
        amount: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let tax_minor = percent_of_minor(&self.0, amount.to_minor_units())?;

        Ok(Money::from_minor(tax_minor, amount.currency()))
    }

    /// The rate expressed in percent points, for display.
    #[must_use]
    pub fn percent_points(&self) -> Decimal {
        ((self.0 * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self::standard()
    }
}

/// The amounts due at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutTotals<'a> {
    /// Sum of every line at cart quantities.
    pub subtotal: Money<'a, Currency>,

    /// Sales tax on the subtotal.
    pub tax: Money<'a, Currency>,

    /// Subtotal plus tax.
    pub total: Money<'a, Currency>,
}

/// Extended price for a line: unit price times cart quantity.
///
/// Bagged quantities play no part here; only what the shopper declared for
/// purchase is billed.
///
/// # Errors
///
/// Returns [`PricingError::AmountConversion`] if the multiplication
/// overflows minor units.
pub fn line_total<'a>(line: &LineItem<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let total_minor = line
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(line.cart_quantity()))
        .ok_or(PricingError::AmountConversion)?;

    Ok(Money::from_minor(total_minor, line.unit_price().currency()))
}

/// Sums the extended prices of a set of lines.
///
/// The currency is taken from the caller rather than the lines so that an
/// empty cart still prices to zero.
///
/// # Errors
///
/// Returns a [`PricingError`] if any line total overflows or money addition
/// fails.
pub fn cart_total<'a>(
    lines: &[LineItem<'a>],
    currency: &'static Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line_total(line)?)?)
        })
}

/// Prices a cart for checkout: subtotal, tax on the subtotal, and the grand
/// total.
///
/// # Errors
///
/// Returns a [`PricingError`] if the subtotal, tax, or their sum cannot be
/// computed.
pub fn checkout_totals<'a>(
    cart: &Cart<'a>,
    rate: TaxRate,
) -> Result<CheckoutTotals<'a>, PricingError> {
    let subtotal = cart.subtotal()?;
    let tax = rate.tax_on(&subtotal)?;
    let total = subtotal.add(tax)?;

    Ok(CheckoutTotals {
        subtotal,
        tax,
        total,
    })
}

/// Calculate the percentage of an amount in minor units, rounding half away
/// from zero.
fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::AmountConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage does not expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::AmountConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::AmountConversion)
}
