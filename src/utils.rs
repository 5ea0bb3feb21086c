//! Utils

use clap::{Parser, ValueEnum};

use crate::payment::{CardDetails, InAppMethod, PaymentError, PaymentMethod, UpiId};

/// Arguments for the checkout demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Catalog fixture to shop from
    #[clap(short, long, default_value = "demo")]
    pub fixture: String,

    /// How to pay once every item is bagged
    #[clap(short, long, value_enum, default_value_t = MethodArg::Counter)]
    pub method: MethodArg,

    /// Leave the cart unbagged to show the checkout gate refusing
    #[clap(long)]
    pub skip_bagging: bool,

    /// Settle immediately instead of simulating terminal latency
    #[clap(long)]
    pub instant: bool,
}

/// Payment method choices on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Pay in cash at a staffed counter
    Counter,

    /// Pay in-app with a saved card
    Card,

    /// Pay in-app through UPI
    Upi,
}

impl MethodArg {
    /// Build the full payment method, with stand-in card and UPI details.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if the stand-in details fail validation.
    pub fn into_method(self) -> Result<PaymentMethod, PaymentError> {
        match self {
            MethodArg::Counter => Ok(PaymentMethod::Counter),
            MethodArg::Card => {
                let card = CardDetails::new("4242 4242 4242 9901")?
                    .with_expiry("12/27")
                    .with_cvv("123");

                Ok(PaymentMethod::InApp(InAppMethod::Card(card)))
            }
            MethodArg::Upi => Ok(PaymentMethod::InApp(InAppMethod::Upi(UpiId::new(
                "shopper@okbank",
            )?))),
        }
    }
}
