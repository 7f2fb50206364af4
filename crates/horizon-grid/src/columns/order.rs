//! Fractional order keys.
//!
//! Column order is stored as strings over `a..=z` compared lexicographically.
//! A key never ends with `a`, which keeps lexicographic order equal to the
//! order of the base-26 fractions the keys spell, so there is always room for
//! another key between two distinct keys.

use horizon_grid_core::logging::targets;

use crate::error::{Error, Result};

const BASE: i32 = 26;

fn to_digits(key: &str) -> Vec<i32> {
    key.bytes()
        .map(|b| (i32::from(b) - i32::from(b'a')).clamp(0, BASE - 1))
        .collect()
}

fn to_key(digits: &[i32]) -> String {
    digits
        .iter()
        .map(|&d| char::from(b'a' + d as u8))
        .collect()
}

/// Digits strictly between `a` and `b`, with `None` standing for 1.0.
///
/// Requires `a < b` and neither input ending in a zero digit.
fn midpoint(a: &[i32], b: Option<&[i32]>) -> Vec<i32> {
    if let Some(b) = b {
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(0) == b[n] {
            n += 1;
        }
        if n > 0 {
            let mut out = b[..n].to_vec();
            out.extend(midpoint(a.get(n..).unwrap_or(&[]), Some(&b[n..])));
            return out;
        }
    }

    let digit_a = a.first().copied().unwrap_or(0);
    let digit_b = b.and_then(|b| b.first().copied()).unwrap_or(BASE);
    if digit_b - digit_a > 1 {
        return vec![(digit_a + digit_b) / 2];
    }
    if let Some(b) = b
        && b.len() > 1
    {
        return vec![b[0]];
    }
    let mut out = vec![digit_a];
    out.extend(midpoint(a.get(1..).unwrap_or(&[]), None));
    out
}

/// Returns a key that sorts strictly between `prev` and `next`.
///
/// A missing bound means the start or the end of the sequence. If the bounds
/// are not ordered, or `next` ends with `a`, the key is placed after `prev`
/// and `next` is ignored.
///
/// # Example
///
/// ```
/// use horizon_grid::columns::order_between;
///
/// let first = order_between(None, None);
/// let second = order_between(Some(&first), None);
/// let middle = order_between(Some(&first), Some(&second));
/// assert!(first < middle && middle < second);
/// ```
pub fn order_between(prev: Option<&str>, next: Option<&str>) -> String {
    let prev = prev.filter(|p| !p.is_empty());
    let a = prev.map(to_digits).unwrap_or_default();

    let b = match next {
        Some(next) => {
            let ordered = prev.is_none_or(|p| p < next);
            if ordered && !next.is_empty() && !next.ends_with('a') {
                Some(to_digits(next))
            } else {
                tracing::warn!(
                    target: targets::COLUMNS,
                    prev = ?prev,
                    next,
                    "order keys out of sequence, placing after the previous key"
                );
                None
            }
        }
        None => None,
    };

    to_key(&midpoint(&a, b.as_deref()))
}

/// Checks that `key` only uses `a..=z` and does not end with `a`.
pub fn validate_order_key(key: &str) -> Result<()> {
    let well_formed = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_lowercase())
        && !key.ends_with('a');
    if well_formed {
        Ok(())
    } else {
        Err(Error::invalid_order_key(key))
    }
}

/// Generates `count` increasing keys for a fresh sequence.
pub fn initial_orders(count: usize) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(count);
    for _ in 0..count {
        let next = order_between(keys.last().map(String::as_str), None);
        keys.push(next);
    }
    keys
}
