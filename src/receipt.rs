//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::Catalog,
    payment::{PaymentConfirmation, PaymentMethod, TransactionReference},
    pricing::{CheckoutTotals, PricingError, TaxRate, line_total},
    products::ProductKey,
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error pricing a cart line.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A cart line's product is missing from the catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One printed line: a product at its cart quantity.
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    name: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    line_total: Money<'a, Currency>,
}

impl<'a> ReceiptLine<'a> {
    /// Product display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units billed.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit as captured at scan time.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Extended price for the line.
    #[must_use]
    pub fn line_total(&self) -> &Money<'a, Currency> {
        &self.line_total
    }
}

/// Final receipt for a settled session.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    totals: CheckoutTotals<'a>,
    tax_rate: TaxRate,
    method: PaymentMethod,
    confirmation: PaymentConfirmation,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a settled cart.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::MissingProduct`] if a cart line's product is
    /// not in the catalog, or a pricing error if a line total cannot be
    /// computed.
    pub fn new(
        cart: &Cart<'a>,
        catalog: &Catalog<'a>,
        totals: CheckoutTotals<'a>,
        tax_rate: TaxRate,
        method: PaymentMethod,
        confirmation: PaymentConfirmation,
    ) -> Result<Self, ReceiptError> {
        let mut lines: SmallVec<[ReceiptLine<'a>; 8]> = SmallVec::new();

        for line in cart.iter() {
            let product = catalog
                .product(line.product())
                .ok_or(ReceiptError::MissingProduct(line.product()))?;

            lines.push(ReceiptLine {
                name: product.name.clone(),
                quantity: line.cart_quantity(),
                unit_price: *line.unit_price(),
                line_total: line_total(line)?,
            });
        }

        Ok(Receipt {
            lines,
            totals,
            tax_rate,
            method,
            confirmation,
        })
    }

    /// Printed lines, in first-scan order.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Sum of every line.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.totals.subtotal
    }

    /// Sales tax charged on the subtotal.
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        self.totals.tax
    }

    /// Amount charged to the payment method.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.totals.total
    }

    /// How the session was paid.
    #[must_use]
    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    /// Terminal reference for the charge.
    #[must_use]
    pub fn reference(&self) -> &TransactionReference {
        self.confirmation.reference()
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        self.write_table(&mut out)?;
        self.write_summary(&mut out)?;

        Ok(())
    }

    fn write_table(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Qty", "Item", "Unit Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                format!("{}x", line.quantity),
                line.name.clone(),
                format!("{}", line.unit_price),
                format!("{}", line.line_total),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let subtotal_label = " Subtotal:";
        let tax_label = format!(" Tax ({}%):", self.tax_rate.percent_points().normalize());
        let total_label = " \x1b[1mTotal:\x1b[0m";

        let subtotal_val = format!("{}  ", self.totals.subtotal);
        let tax_val = format!("{}  ", self.totals.tax);
        let total_val = format!("{}  ", self.totals.total);

        let label_width = visible_width(subtotal_label)
            .max(visible_width(&tax_label))
            .max(visible_width(total_label));

        let value_width = subtotal_val.len().max(tax_val.len()).max(total_val.len());

        write_summary_line(out, subtotal_label, &subtotal_val, label_width, value_width)?;
        write_summary_line(out, &tax_label, &tax_val, label_width, value_width)?;

        write_summary_line(
            out,
            total_label,
            &format!("\x1b[1m{total_val}\x1b[0m"),
            label_width,
            value_width,
        )?;

        writeln!(out).map_err(|_err| ReceiptError::IO)?;
        writeln!(out, " Paid via {}", self.method).map_err(|_err| ReceiptError::IO)?;

        writeln!(out, " Transaction #{}", self.confirmation.reference())
            .map_err(|_err| ReceiptError::IO)?;

        Ok(())
    }
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;
    use rusty_money::iso::USD;
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::{
        pricing::checkout_totals,
        products::{Barcode, Product},
    };

    use super::*;

    struct Fixture {
        catalog: Catalog<'static>,
        milk: ProductKey,
        bananas: ProductKey,
    }

    fn fixture() -> Fixture {
        let mut catalog = Catalog::new(USD);

        let milk = catalog
            .insert(Product {
                name: "Organic Milk 1L".into(),
                category: "Dairy".into(),
                barcode: Barcode::new("400123456"),
                image_url: None,
                price: Money::from_minor(450, USD),
            })
            .expect("product should insert");

        let bananas = catalog
            .insert(Product {
                name: "Fresh Bananas (Bunch)".into(),
                category: "Produce".into(),
                barcode: Barcode::new("400987654"),
                image_url: None,
                price: Money::from_minor(220, USD),
            })
            .expect("product should insert");

        Fixture {
            catalog,
            milk,
            bananas,
        }
    }

    fn confirmation() -> PaymentConfirmation {
        PaymentConfirmation::new(TransactionReference::generate(&mut StepRng::new(0, 1)))
    }

    fn receipt(fixture: &Fixture) -> Result<Receipt<'static>, ReceiptError> {
        let mut cart = Cart::new(USD);
        cart.record_cart_scan(fixture.milk, Money::from_minor(450, USD));
        cart.record_cart_scan(fixture.milk, Money::from_minor(450, USD));
        cart.record_cart_scan(fixture.bananas, Money::from_minor(220, USD));

        let totals = checkout_totals(&cart, TaxRate::standard())?;

        Receipt::new(
            &cart,
            &fixture.catalog,
            totals,
            TaxRate::standard(),
            PaymentMethod::Counter,
            confirmation(),
        )
    }

    #[test]
    fn lines_follow_first_scan_order_with_extended_prices() -> TestResult {
        let fixture = fixture();
        let receipt = receipt(&fixture)?;

        let summary: Vec<(String, u32, i64)> = receipt
            .lines()
            .iter()
            .map(|line| {
                (
                    line.name().to_string(),
                    line.quantity(),
                    line.line_total().to_minor_units(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Organic Milk 1L".to_string(), 2, 900),
                ("Fresh Bananas (Bunch)".to_string(), 1, 220),
            ]
        );

        Ok(())
    }

    #[test]
    fn totals_are_carried_from_checkout() -> TestResult {
        let fixture = fixture();
        let receipt = receipt(&fixture)?;

        assert_eq!(receipt.subtotal(), Money::from_minor(1120, USD));
        assert_eq!(receipt.tax(), Money::from_minor(56, USD));
        assert_eq!(receipt.total(), Money::from_minor(1176, USD));

        Ok(())
    }

    #[test]
    fn unknown_cart_product_is_a_missing_product_error() -> TestResult {
        let fixture = fixture();

        let mut foreign_keys: SlotMap<ProductKey, ()> = SlotMap::with_key();
        // A fresh map's first key is bit-identical to the catalog's first
        // key; recycle the slot so the version can never match an entry.
        let recycled = foreign_keys.insert(());
        foreign_keys.remove(recycled);
        let stray = foreign_keys.insert(());

        let mut cart = Cart::new(USD);
        cart.record_cart_scan(stray, Money::from_minor(100, USD));

        let totals = checkout_totals(&cart, TaxRate::standard())?;

        let result = Receipt::new(
            &cart,
            &fixture.catalog,
            totals,
            TaxRate::standard(),
            PaymentMethod::Counter,
            confirmation(),
        );

        assert!(matches!(result, Err(ReceiptError::MissingProduct(_))));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let fixture = fixture();
        let receipt = receipt(&fixture)?;

        let mut out = Vec::new();
        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Organic Milk 1L"));
        assert!(rendered.contains("2x"));
        assert!(rendered.contains("$9.00"));
        assert!(rendered.contains("Subtotal:"));
        assert!(rendered.contains("Tax (5%):"));
        assert!(rendered.contains("$11.76"));
        assert!(rendered.contains("Paid via Pay at counter"));
        assert!(rendered.contains("Transaction #SS-100-1001"));

        Ok(())
    }

    #[test]
    fn write_to_surfaces_io_failures() -> TestResult {
        struct FailingWriter;

        impl io::Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("sink closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let fixture = fixture();
        let receipt = receipt(&fixture)?;

        assert!(matches!(
            receipt.write_to(FailingWriter),
            Err(ReceiptError::IO)
        ));

        Ok(())
    }
}
