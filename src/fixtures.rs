//! Fixtures
//!
//! Store catalogs are YAML files under `fixtures/catalog/`, one file per
//! store. Prices are written as `"AMOUNT CURRENCY"` strings; the catalog's
//! currency is taken from the first product in the file.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    products::{Barcode, Product},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Empty product list
    #[error("No products in fixture; currency unknown")]
    NoProducts,

    /// Catalog rejected a product
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Wrapper for a catalog file in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products in shelf order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product category
    pub category: String,

    /// Barcode as printed on the item
    pub barcode: String,

    /// Product price (e.g., "4.50 USD")
    pub price: String,

    /// Optional product image URL
    pub image: Option<String>,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        Ok(Product {
            name: fixture.name,
            category: fixture.category,
            barcode: Barcode::new(fixture.barcode),
            image_url: fixture.image,
            price,
        })
    }
}

/// Load a catalog fixture by name from the default `./fixtures` directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the
/// products do not form a valid single-currency catalog.
pub fn load_catalog(name: &str) -> Result<Catalog<'static>, FixtureError> {
    load_catalog_from("./fixtures", name)
}

/// Load a catalog fixture by name from a custom base directory.
///
/// The catalog's currency is taken from the first product in the file;
/// every further product must be priced in that currency, and barcodes
/// must be unique across the file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if a price or
/// currency code is malformed, if the file has no products, or if the
/// catalog rejects a product.
pub fn load_catalog_from(
    base: impl AsRef<Path>,
    name: &str,
) -> Result<Catalog<'static>, FixtureError> {
    let file_path = base.as_ref().join("catalog").join(format!("{name}.yml"));
    let contents = fs::read_to_string(&file_path)?;
    let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

    let first = fixture.products.first().ok_or(FixtureError::NoProducts)?;
    let (_minor_units, currency) = parse_price(&first.price)?;

    let mut catalog = Catalog::new(currency);

    for product_fixture in fixture.products {
        let product: Product<'static> = product_fixture.try_into()?;
        catalog.insert(product)?;
    }

    debug!(
        products = catalog.len(),
        currency = currency.iso_alpha_code,
        "loaded catalog fixture"
    );

    Ok(catalog)
}

/// Parse price string (e.g., "4.50 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "USD" => USD,
        "GBP" => GBP,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_missing_separator() {
        let result = parse_price("4.50USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("4.50 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_the_catalog_currencies() -> Result<(), FixtureError> {
        let (usd_minor, usd) = parse_price("4.50 USD")?;
        let (gbp_minor, gbp) = parse_price("2.20 GBP")?;
        let (eur_minor, eur) = parse_price("1.50 EUR")?;

        assert_eq!(usd_minor, 450);
        assert_eq!(usd, USD);
        assert_eq!(gbp_minor, 220);
        assert_eq!(gbp, GBP);
        assert_eq!(eur_minor, 150);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn parse_price_accepts_whole_amounts() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("3 USD")?;

        assert_eq!(minor, 300);
        assert_eq!(currency, USD);

        Ok(())
    }

    #[test]
    fn product_fixture_builds_a_product() -> Result<(), FixtureError> {
        let fixture = ProductFixture {
            name: "Organic Milk 1L".into(),
            category: "Dairy".into(),
            barcode: "400123456".into(),
            price: "4.50 USD".into(),
            image: None,
        };

        let product: Product<'_> = fixture.try_into()?;

        assert_eq!(product.name, "Organic Milk 1L");
        assert_eq!(product.category, "Dairy");
        assert_eq!(product.barcode.as_str(), "400123456");
        assert!(product.image_url.is_none());
        assert_eq!(product.price, Money::from_minor(450, USD));

        Ok(())
    }
}
