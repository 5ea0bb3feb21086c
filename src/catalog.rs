//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Barcode, Product, ProductKey};

/// Errors related to catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency (name, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),

    /// Two products share the same barcode.
    #[error("Barcode {0} is already registered")]
    DuplicateBarcode(Barcode),
}

/// Static product catalog, loaded once at startup and read-only afterwards.
///
/// Products are kept in the order they were added (for display surfaces) and
/// indexed by barcode so raw scanner codes resolve to a [`ProductKey`].
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    order: Vec<ProductKey>,
    barcodes: FxHashMap<Barcode, ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create a new empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Catalog {
            products: SlotMap::with_key(),
            order: Vec::new(),
            barcodes: FxHashMap::default(),
            currency,
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the product's price currency differs
    /// from the catalog currency, or its barcode is already registered.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.name.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if self.barcodes.contains_key(&product.barcode) {
            return Err(CatalogError::DuplicateBarcode(product.barcode.clone()));
        }

        let barcode = product.barcode.clone();
        let key = self.products.insert(product);

        self.order.push(key);
        self.barcodes.insert(barcode, key);

        Ok(key)
    }

    /// Resolve a raw scanned code to a product key.
    ///
    /// Unknown codes resolve to `None`; whether that is worth reporting is
    /// the scanning surface's decision, not an error here.
    #[must_use]
    pub fn resolve_barcode(&self, raw_code: &str) -> Option<ProductKey> {
        self.barcodes.get(raw_code).copied()
    }

    /// Get a product by key.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Iterate over products in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.order
            .iter()
            .filter_map(|key| self.products.get(*key).map(|product| (*key, product)))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency shared by every price in the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
