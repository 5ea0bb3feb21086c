//! Insights
//!
//! Advisory shopping insights generated from a snapshot of the cart. The
//! session treats this as a best-effort extra: a failing source degrades
//! to "no insight" and never blocks checkout.

use thiserror::Error;

use crate::{cart::Cart, catalog::Catalog};

/// Errors from an insight source.
#[derive(Debug, Error)]
pub enum InsightError {
    /// No items to analyse.
    #[error("no items to analyse")]
    NoItems,

    /// The backing source failed to produce an insight.
    #[error("insight source unavailable: {0}")]
    Unavailable(String),
}

/// Advice derived from the cart contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingInsight {
    /// A quick recipe idea using some of the items.
    pub recipe_suggestion: String,

    /// Estimated calorie count for the whole cart.
    pub total_calories: u32,

    /// One health or money saving tip for these items.
    pub saving_tips: String,
}

/// Snapshot of one cart line handed to an insight source.
///
/// Sources see plain names and quantities rather than catalog keys, so they
/// need no access to the cart or the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightItem {
    /// Display name of the product.
    pub name: String,

    /// Catalog category, for example "Dairy".
    pub category: String,

    /// Units the shopper intends to buy.
    pub quantity: u32,

    /// Unit price in minor units.
    pub unit_price_minor: i64,
}

impl InsightItem {
    /// Snapshot every cart line against the catalog, in line order.
    ///
    /// Lines whose product no longer resolves are skipped; the snapshot is
    /// advisory, not billing data.
    #[must_use]
    pub fn from_cart(cart: &Cart<'_>, catalog: &Catalog<'_>) -> Vec<InsightItem> {
        cart.iter()
            .filter_map(|line| {
                let product = catalog.product(line.product())?;

                Some(InsightItem {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    quantity: line.cart_quantity(),
                    unit_price_minor: line.unit_price().to_minor_units(),
                })
            })
            .collect()
    }
}

/// Source of shopping insights for a cart snapshot.
pub trait InsightSource {
    /// Produce an insight for the given items.
    ///
    /// # Errors
    ///
    /// Returns an [`InsightError`] when no insight can be produced, including
    /// when `items` is empty.
    fn shopping_insights(&self, items: &[InsightItem]) -> Result<ShoppingInsight, InsightError>;
}

/// Per-unit calorie estimates by catalog category.
const CALORIES_PER_UNIT: [(&str, u32); 5] = [
    ("Dairy", 150),
    ("Produce", 105),
    ("Bakery", 250),
    ("Beverages", 40),
    ("Pantry", 180),
];

const FALLBACK_CALORIES_PER_UNIT: u32 = 120;

fn calories_per_unit(category: &str) -> u32 {
    CALORIES_PER_UNIT
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(FALLBACK_CALORIES_PER_UNIT, |(_, calories)| *calories)
}

/// Offline, deterministic insight source.
///
/// Stands in for a generative backend so demos and tests run without a
/// network. Calories come from the coarse per-category table, the recipe
/// from the first lines of the cart, and the saving tip from the largest
/// line by extended price.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalInsights;

impl InsightSource for LocalInsights {
    fn shopping_insights(&self, items: &[InsightItem]) -> Result<ShoppingInsight, InsightError> {
        let (first, rest) = items.split_first().ok_or(InsightError::NoItems)?;

        let total_calories = items.iter().fold(0u32, |acc, item| {
            acc.saturating_add(calories_per_unit(&item.category).saturating_mul(item.quantity))
        });

        let recipe_suggestion = match rest.first() {
            Some(second) => format!(
                "Quick idea: plate up the {} with the {} for an easy snack board.",
                first.name.to_lowercase(),
                second.name.to_lowercase(),
            ),
            None => format!(
                "Quick idea: the {} works on its own; pick up a pantry staple next trip for a fuller dish.",
                first.name.to_lowercase(),
            ),
        };

        let biggest = items
            .iter()
            .max_by_key(|item| i64::from(item.quantity).saturating_mul(item.unit_price_minor))
            .unwrap_or(first);

        let saving_tips = format!(
            "{} is the biggest line this trip; compare the larger pack's per-unit price before you pay.",
            biggest.name,
        );

        Ok(ShoppingInsight {
            recipe_suggestion,
            total_calories,
            saving_tips,
        })
    }
}
