//! Swiftscan
//!
//! Swiftscan is a self-checkout engine for mobile retail: scan items into a
//! cart, confirm them into bags, and pay once the two tallies reconcile.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod fixtures;
pub mod insights;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod scanner;
pub mod utils;
