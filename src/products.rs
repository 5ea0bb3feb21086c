//! Products

use std::{borrow::Borrow, fmt};

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// A barcode as printed on a physical item.
///
/// Scanner hardware and manual entry both produce these raw strings; the
/// catalog resolves them to a [`ProductKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode(String);

impl Barcode {
    /// Creates a new barcode from a raw code string.
    pub fn new(code: impl Into<String>) -> Self {
        Barcode(code.into())
    }

    /// Returns the raw code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Barcode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Barcode {
    fn from(code: &str) -> Self {
        Barcode::new(code)
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product name
    pub name: String,

    /// Display category (e.g. "Dairy", "Produce")
    pub category: String,

    /// Barcode printed on the item
    pub barcode: Barcode,

    /// Optional product image URL for display surfaces
    pub image_url: Option<String>,

    /// Unit price
    pub price: Money<'a, Currency>,
}
