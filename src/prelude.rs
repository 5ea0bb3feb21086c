//! Swiftscan prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, LineItem, Verification},
    catalog::{Catalog, CatalogError},
    checkout::{Session, SessionError, Stage},
    fixtures::{FixtureError, load_catalog, load_catalog_from},
    insights::{InsightError, InsightItem, InsightSource, LocalInsights, ShoppingInsight},
    payment::{
        CardDetails, InAppMethod, MockTerminal, PaymentConfirmation, PaymentError, PaymentMethod,
        PaymentTerminal, TransactionReference, UpiId,
    },
    pricing::{CheckoutTotals, PricingError, TaxRate, checkout_totals},
    products::{Barcode, Product, ProductKey},
    receipt::{Receipt, ReceiptError, ReceiptLine},
    scanner::{ScanCooldown, Scanner},
};
