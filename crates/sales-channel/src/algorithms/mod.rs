//! # Algorithms Module
//!
//! Pure functions: canonical encoding, input validation, sales analytics.

pub mod analytics;
pub mod encoding;
pub mod validation;

pub use analytics::{sales_per_seller, SalesSeries};
pub use encoding::{canonical_bytes, signing_message, verify_proof, SignedSubmission};
pub use validation::{parse_amount, require_non_empty};
