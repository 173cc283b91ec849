//! Page index validation
//!
//! Indices arrive as signed integers from request parameters and are checked
//! against the page count before any mutation takes place.

use std::collections::{BTreeSet, HashSet};

use super::error::{OperationError, Result};

fn in_range(page: i64, page_count: usize) -> Option<usize> {
    usize::try_from(page).ok().filter(|&p| p < page_count)
}

/// Validate a single page index
pub fn check_page(page: i64, page_count: usize) -> Result<usize> {
    in_range(page, page_count).ok_or(OperationError::InvalidPageIndex {
        pages: vec![page],
        page_count,
    })
}

/// Validate a list of page indices, reporting every offender at once
pub fn check_pages(pages: &[i64], page_count: usize) -> Result<Vec<usize>> {
    let invalid: Vec<i64> = pages
        .iter()
        .copied()
        .filter(|&p| in_range(p, page_count).is_none())
        .collect();

    if !invalid.is_empty() {
        return Err(OperationError::InvalidPageIndex {
            pages: invalid,
            page_count,
        });
    }

    Ok(pages.iter().filter_map(|&p| in_range(p, page_count)).collect())
}

/// Validate a complete page permutation
pub fn check_order(order: &[i64], page_count: usize) -> Result<Vec<usize>> {
    if order.len() != page_count {
        return Err(OperationError::OrderLengthMismatch {
            expected: page_count,
            actual: order.len(),
        });
    }

    let order = check_pages(order, page_count)?;

    let mut seen = HashSet::with_capacity(order.len());
    let duplicates: BTreeSet<usize> = order.iter().copied().filter(|p| !seen.insert(*p)).collect();
    if !duplicates.is_empty() {
        return Err(OperationError::OrderNotPermutation {
            duplicates: duplicates.into_iter().collect(),
        });
    }

    Ok(order)
}

/// Unique indices, highest first, so earlier deletions never shift later ones
pub fn deletion_order(pages: &[usize]) -> Vec<usize> {
    let unique: BTreeSet<usize> = pages.iter().copied().collect();
    unique.into_iter().rev().collect()
}
