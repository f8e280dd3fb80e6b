//! Cached binomial coefficients (Pascal's triangle).
//!
//! Rows only store `r <= n / 2`; the other half is read through symmetry.
//! The table grows on demand and is shared process-wide behind a lock, so
//! lookups are `O(1)` once a row exists.

use std::sync::{PoisonError, RwLock};

static TABLE: RwLock<Vec<Vec<f64>>> = RwLock::new(Vec::new());

/// Number of ways `r` items can be chosen from `n`.
///
/// Returns 0 if `r > n`. Double precision is used so large results stay
/// approximately representable; past `C(1030, 515)` the middle of a row
/// overflows to infinity, which callers can detect with `is_finite`.
pub fn binomial(n: usize, r: usize) -> f64 {
    if r > n {
        return 0.0;
    }
    let r = if 2 * r > n { n - r } else { r };

    {
        let rows = TABLE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(row) = rows.get(n) {
            return row[r];
        }
    }

    let mut rows = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    if rows.len() <= n {
        let target = n.max(2 * rows.len()) + 1;
        grow(&mut rows, target);
    }
    rows[n][r]
}

/// Release the cached rows.
pub fn reset_binomial_cache() {
    let mut rows = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    rows.clear();
    rows.shrink_to_fit();
}

fn grow(rows: &mut Vec<Vec<f64>>, target: usize) {
    if rows.is_empty() {
        rows.push(vec![1.0]);
    }
    log::trace!("growing binomial table from {} to {} rows", rows.len(), target);
    rows.reserve(target - rows.len());

    for i in rows.len()..target {
        let prev = &rows[i - 1];
        let mut row = vec![0.0; i / 2 + 1];
        row[0] = 1.0;
        for j in 1..row.len() {
            // prev[j] past the stored half mirrors prev[j - 1]
            let right = prev.get(j).copied().unwrap_or(prev[j - 1]);
            row[j] = prev[j - 1] + right;
        }
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(binomial(0, 0), 1.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(5, 3), 10.0);
        assert_eq!(binomial(6, 3), 20.0);
        assert_eq!(binomial(10, 5), 252.0);
        assert_eq!(binomial(4, 5), 0.0);
    }

    #[test]
    fn test_row_sums_are_powers_of_two() {
        for n in 0..40 {
            let sum: f64 = (0..=n).map(|r| binomial(n, r)).sum();
            assert_eq!(sum, 2f64.powi(n as i32), "row {n}");
        }
    }

    #[test]
    fn test_overflow_is_infinite() {
        assert!(binomial(1030, 100).is_finite());
        assert!(binomial(1031, 515).is_infinite());
        assert!(binomial(1031, 0).is_finite());
    }
}
