//! Field-level input checks used by the transaction builder.

use crate::domain::{Amount, ChannelError, MAX_SAFE_INTEGER};

/// Trimmed value of a required text field.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<String, ChannelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ChannelError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Parse a numeric field into a finite, non-negative [`Amount`] no larger
/// than [`MAX_SAFE_INTEGER`].
pub fn parse_amount(field: &'static str, raw: &str) -> Result<Amount, ChannelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChannelError::invalid(field, "must not be empty"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ChannelError::invalid(field, format!("{trimmed:?} is not a number")))?;

    if value > MAX_SAFE_INTEGER {
        return Err(ChannelError::invalid(field, "must not exceed 2^53 - 1"));
    }
    Amount::new(value)
        .ok_or_else(|| ChannelError::invalid(field, "must be finite and non-negative"))
}
