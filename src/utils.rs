//! This module provides a set of shared, low-level utility functions used
//! throughout the prepcv core.
//!
//! Its primary responsibilities include:
//! 1.  The generic Cartesian product that both parameter expansion and
//!     pipeline resolution are built on.
//! 2.  Small index helpers shared by the image kernels.

//==================================================================================
// 1. Combinatorics
//==================================================================================

/// Returns the Cartesian product of `axes` in lexicographic order.
///
/// The first axis varies slowest and the last axis varies fastest, which is the
/// same order a nested `for` loop over the axes would produce.
///
/// # Args
/// * `axes`: One slice of choices per position.
///
/// # Returns
/// Every combination, each with exactly one element per axis. An empty `axes`
/// yields one empty combination; any empty axis yields no combinations.
pub fn cartesian_product<T: Clone>(axes: &[Vec<T>]) -> Vec<Vec<T>> {
    if axes.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let capacity = axes
        .iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
        .unwrap_or(0);
    let mut combinations = Vec::with_capacity(capacity);

    // Odometer over the axis indices; the last digit turns fastest.
    let mut cursor = vec![0usize; axes.len()];
    loop {
        combinations.push(
            cursor
                .iter()
                .zip(axes)
                .map(|(&i, axis)| axis[i].clone())
                .collect(),
        );

        let mut position = axes.len();
        loop {
            if position == 0 {
                return combinations;
            }
            position -= 1;
            cursor[position] += 1;
            if cursor[position] < axes[position].len() {
                break;
            }
            cursor[position] = 0;
        }
    }
}

/// `ceil(a / b)` for positive `b`.
pub fn div_ceil(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

//==================================================================================
// 2. Kernel Helpers
//==================================================================================

/// Clamps a signed coordinate into `0..len`, replicating the border sample.
#[inline]
pub fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else if i as usize >= len {
        len - 1
    } else {
        i as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_order_last_axis_fastest() {
        let axes = vec![vec!['a', 'b'], vec!['x', 'y', 'z']];
        let product = cartesian_product(&axes);
        let flat: Vec<String> = product.iter().map(|c| c.iter().collect()).collect();
        assert_eq!(flat, vec!["ax", "ay", "az", "bx", "by", "bz"]);
    }

    #[test]
    fn test_product_identity_and_zero() {
        let none: Vec<Vec<u8>> = vec![];
        assert_eq!(cartesian_product(&none), vec![Vec::<u8>::new()]);

        let with_empty = vec![vec![1, 2], vec![]];
        assert!(cartesian_product(&with_empty).is_empty());
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(0, 3), 0);
        assert_eq!(div_ceil(3, 3), 1);
        assert_eq!(div_ceil(4, 3), 2);
    }

    #[test]
    fn test_clamp_index_replicates_border() {
        assert_eq!(clamp_index(-2, 5), 0);
        assert_eq!(clamp_index(2, 5), 2);
        assert_eq!(clamp_index(9, 5), 4);
    }
}
