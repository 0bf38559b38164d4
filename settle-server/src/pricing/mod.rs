//! Order price calculation

pub mod calculator;

pub use calculator::{PriceQuote, PricingError, quote};
