//! Cart

use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::{PricingError, cart_total},
    products::ProductKey,
};

/// A single product line in the cart.
///
/// Each line tracks two quantities: how many units the shopper scanned with
/// intent to buy (`cart_quantity`) and how many they re-scanned while placing
/// them into bags (`bagged_quantity`). The bagged count never exceeds the
/// cart count; both mutations below preserve that.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    unit_price: Money<'a, Currency>,
    cart_quantity: u32,
    bagged_quantity: u32,
}

impl<'a> LineItem<'a> {
    /// A line as created by a product's first cart scan: one unit in the
    /// cart, nothing bagged yet.
    fn new(product: ProductKey, unit_price: Money<'a, Currency>) -> Self {
        LineItem {
            product,
            unit_price,
            cart_quantity: 1,
            bagged_quantity: 0,
        }
    }

    /// Returns the product this line is for.
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the unit price captured when the product was first scanned.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Units the shopper has declared intent to buy.
    #[must_use]
    pub fn cart_quantity(&self) -> u32 {
        self.cart_quantity
    }

    /// Units confirmed as physically placed in a bag.
    #[must_use]
    pub fn bagged_quantity(&self) -> u32 {
        self.bagged_quantity
    }

    /// Units still awaiting a bag scan.
    #[must_use]
    pub fn outstanding(&self) -> u32 {
        self.cart_quantity.saturating_sub(self.bagged_quantity)
    }

    /// True once every cart unit on this line has been bagged.
    #[must_use]
    pub fn is_fully_bagged(&self) -> bool {
        self.bagged_quantity == self.cart_quantity
    }
}

/// Result of checking cart totals against bagged totals.
///
/// Derived from scratch on every call; nothing here is cached between
/// mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Total units scanned into the cart.
    pub total_cart: u32,

    /// Total units confirmed into bags.
    pub total_bagged: u32,

    /// Units still awaiting a bag scan.
    pub remaining: u32,

    /// True when the cart is non-empty and every unit has been bagged.
    ///
    /// An empty cart is never verified: there is nothing to check out.
    pub is_verified: bool,
}

/// Cart
///
/// Line items in first-scan order, at most one line per product. The cart is
/// the single writer's session state: it is created empty, mutated only by
/// the two scan operations, and cleared wholesale on session reset.
#[derive(Debug)]
pub struct Cart<'a> {
    lines: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Record a scan of a resolved product into the cart.
    ///
    /// Creates the line with one unit on the product's first scan, otherwise
    /// increments its cart quantity. Quantities never decrease and the
    /// operation never fails; resolving the identifier to a real product is
    /// the scanning surface's job.
    pub fn record_cart_scan(&mut self, product: ProductKey, unit_price: Money<'a, Currency>) {
        if let Some(line) = self.line_mut(product) {
            line.cart_quantity = line.cart_quantity.saturating_add(1);
            return;
        }

        self.lines.push(LineItem::new(product, unit_price));
    }

    /// Record a bag-confirmation scan for a product.
    ///
    /// Increments the bagged quantity only while it is below the cart
    /// quantity. A scan for a product with no line, or for a line that is
    /// already fully bagged, is silently ignored; it is neither an error
    /// nor reported to the caller.
    pub fn record_bag_scan(&mut self, product: ProductKey) {
        if let Some(line) = self.line_mut(product) {
            if line.bagged_quantity < line.cart_quantity {
                line.bagged_quantity += 1;
            }
        }
    }

    /// Check cart totals against bagged totals.
    #[must_use]
    pub fn verification(&self) -> Verification {
        let total_cart: u32 = self.lines.iter().map(LineItem::cart_quantity).sum();
        let total_bagged: u32 = self.lines.iter().map(LineItem::bagged_quantity).sum();

        Verification {
            total_cart,
            total_bagged,
            remaining: total_cart.saturating_sub(total_bagged),
            is_verified: total_cart > 0 && total_cart == total_bagged,
        }
    }

    /// Subtotal payable for the cart.
    ///
    /// Billing is based on cart quantities, never on bagged quantities:
    /// bagging gates checkout eligibility, it does not change the amount
    /// due.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows minor units or
    /// money addition fails.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        cart_total(&self.lines, self.currency)
    }

    /// Get the line for a product, if one exists.
    #[must_use]
    pub fn line(&self, product: ProductKey) -> Option<&LineItem<'a>> {
        self.lines.iter().find(|line| line.product == product)
    }

    /// All lines in first-scan order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem<'a>] {
        &self.lines
    }

    /// Iterate over the lines in first-scan order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.lines.iter()
    }

    /// Number of distinct product lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency shared by every line.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Discard every line, returning the cart to its freshly created state.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product: ProductKey) -> Option<&mut LineItem<'a>> {
        self.lines.iter_mut().find(|line| line.product == product)
    }
}
