//! Offset-window arithmetic for paginated listings.
//!
//! [`compute`] turns a (total, limit, offset) triple into the window
//! metadata the list endpoints return alongside a page of items. It is pure
//! arithmetic: no storage access, no hidden state, identical inputs always
//! produce identical output.

use serde::{Deserialize, Serialize};

/// Window metadata describing the slices adjacent to the requested one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub total: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_offset: i64,
    pub previous_offset: i64,
    pub next_limit: i64,
    pub previous_limit: i64,
}

/// Rejected pagination inputs: negative total, non-positive limit, or
/// negative offset.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid pagination params: totals={totals} limit={limit} offset={offset}")]
pub struct InvalidPaginationParams {
    pub totals: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Compute the pagination window for a listing of `total` items viewed
/// through a slice of `limit` items starting at `offset`.
///
/// `total == 0` is an explicit special case: the general formula below
/// would describe a window into a collection that does not exist.
pub fn compute(total: i64, limit: i64, offset: i64) -> Result<PageWindow, InvalidPaginationParams> {
    if total < 0 || limit <= 0 || offset < 0 {
        return Err(InvalidPaginationParams {
            totals: total,
            limit,
            offset,
        });
    }

    if total == 0 {
        return Ok(PageWindow {
            total: 0,
            has_next: false,
            has_previous: false,
            next_offset: 0,
            previous_offset: 0,
            next_limit: 0,
            previous_limit: 0,
        });
    }

    let has_next = offset + limit < total;
    let has_previous = offset > 0;

    let next_offset = if has_next {
        (offset + limit).min(total)
    } else {
        offset
    };
    let previous_offset = if has_previous {
        (offset - limit).max(0)
    } else {
        offset
    };

    let next_limit = if has_next {
        limit.min(total - next_offset)
    } else {
        0
    };
    let previous_limit = if has_previous { limit.min(offset) } else { 0 };

    Ok(PageWindow {
        total,
        has_next,
        has_previous,
        next_offset,
        previous_offset,
        next_limit,
        previous_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collection_returns_zero_window() {
        let window = compute(0, 5, 0).unwrap();
        assert_eq!(
            window,
            PageWindow {
                total: 0,
                has_next: false,
                has_previous: false,
                next_offset: 0,
                previous_offset: 0,
                next_limit: 0,
                previous_limit: 0,
            }
        );
    }

    #[test]
    fn first_page_of_ten() {
        let window = compute(10, 5, 0).unwrap();
        assert!(window.has_next);
        assert!(!window.has_previous);
        assert_eq!(window.next_offset, 5);
        assert_eq!(window.next_limit, 5);
        assert_eq!(window.previous_offset, 0);
        assert_eq!(window.previous_limit, 0);
    }

    #[test]
    fn offset_plus_limit_past_total_has_no_next() {
        // offset + limit = 13 > total = 10: the window past the end must
        // not be reported as a next page.
        let window = compute(10, 5, 8).unwrap();
        assert!(!window.has_next);
        assert_eq!(window.next_offset, 8);
        assert_eq!(window.next_limit, 0);
        assert!(window.has_previous);
        assert_eq!(window.previous_offset, 3);
        assert_eq!(window.previous_limit, 5);
    }

    #[test]
    fn last_exact_page() {
        let window = compute(10, 5, 5).unwrap();
        assert!(!window.has_next);
        assert!(window.has_previous);
        assert_eq!(window.previous_offset, 0);
        assert_eq!(window.previous_limit, 5);
    }

    #[test]
    fn middle_page() {
        let window = compute(30, 10, 10).unwrap();
        assert!(window.has_next);
        assert!(window.has_previous);
        assert_eq!(window.next_offset, 20);
        assert_eq!(window.next_limit, 10);
        assert_eq!(window.previous_offset, 0);
        assert_eq!(window.previous_limit, 10);
    }

    #[test]
    fn short_final_slice_clamps_next_limit() {
        let window = compute(12, 5, 5).unwrap();
        assert!(window.has_next);
        assert_eq!(window.next_offset, 10);
        assert_eq!(window.next_limit, 2);
    }

    #[test]
    fn small_offset_clamps_previous() {
        let window = compute(10, 5, 2).unwrap();
        assert!(window.has_previous);
        assert_eq!(window.previous_offset, 0);
        assert_eq!(window.previous_limit, 2);
    }

    #[test]
    fn negative_total_rejected() {
        let err = compute(-1, 5, 0).unwrap_err();
        assert_eq!(err.totals, -1);
    }

    #[test]
    fn zero_limit_rejected() {
        assert!(compute(10, 0, 0).is_err());
    }

    #[test]
    fn negative_limit_rejected() {
        assert!(compute(10, -3, 0).is_err());
    }

    #[test]
    fn negative_offset_rejected() {
        let err = compute(10, 5, -1).unwrap_err();
        assert_eq!(err.offset, -1);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        assert_eq!(compute(100, 7, 42), compute(100, 7, 42));
    }

    #[test]
    fn has_next_and_previous_follow_the_formula() {
        for total in 1..20i64 {
            for limit in 1..8 {
                for offset in 0..total {
                    let window = compute(total, limit, offset).unwrap();
                    assert_eq!(window.has_next, offset + limit < total);
                    assert_eq!(window.has_previous, offset > 0);
                }
            }
        }
    }

    #[test]
    fn window_serializes_camel_case() {
        let window = compute(10, 5, 0).unwrap();
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["nextOffset"], 5);
        assert_eq!(json["previousLimit"], 0);
    }
}
