//! Argument guards for public entry points
//!
//! Each guard fails with [`BlueprintError::InvalidArgument`] naming the
//! offending argument, before any session state is touched.

use crate::error::{BlueprintError, Result};

/// Require a non-blank string
///
/// # Errors
/// Returns [`BlueprintError::InvalidArgument`] if `value` is empty or whitespace
#[inline]
pub fn require_non_empty<'a>(value: &'a str, name: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(BlueprintError::invalid_argument(name, "must not be empty"));
    }
    Ok(value)
}

/// Require a non-empty collection
///
/// # Errors
/// Returns [`BlueprintError::InvalidArgument`] if `values` is empty
#[inline]
pub fn require_non_empty_slice<'a, T>(values: &'a [T], name: &str) -> Result<&'a [T]> {
    if values.is_empty() {
        return Err(BlueprintError::invalid_argument(name, "must contain at least one value"));
    }
    Ok(values)
}

/// Require a strictly positive count
///
/// # Errors
/// Returns [`BlueprintError::InvalidArgument`] if `value` is zero
#[inline]
pub fn require_positive(value: usize, name: &str) -> Result<usize> {
    if value == 0 {
        return Err(BlueprintError::invalid_argument(name, "must be greater than zero"));
    }
    Ok(value)
}
