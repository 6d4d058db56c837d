//! Page window selection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `page_size` / `this_page` pair.
///
/// A negative page counts from the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_size: u64,
    pub this_page: i64,
}

impl Pagination {
    /// Build from request values; missing, zero or non-numeric arguments disable
    /// pagination.
    pub fn from_values(page_size: Option<&Value>, this_page: Option<&Value>) -> Option<Self> {
        let page_size = as_i64(page_size?)?;
        let this_page = as_i64(this_page?)?;
        if page_size <= 0 || this_page == 0 {
            return None;
        }
        Some(Self {
            page_size: page_size as u64,
            this_page,
        })
    }

    /// Half-open `[start, end)` window over a list of `len` items.
    ///
    /// Both bounds resolve like an array slice: a negative bound counts back
    /// from the end, and an end before the start gives an empty window.
    pub fn window(&self, len: usize) -> (usize, usize) {
        let len_i = len as i128;
        let size = self.page_size as i128;
        let page = self.this_page as i128;
        let start = if page > 0 {
            size * (page - 1)
        } else {
            len_i - page.abs() * size
        };
        let resolve = |v: i128| {
            let v = if v < 0 { len_i + v } else { v };
            v.clamp(0, len_i) as usize
        };
        let (start, end) = (resolve(start), resolve(start + size));
        (start, end.max(start))
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Select `pagination`'s window of `items`, or all of them when `None`.
pub fn paginate<T: Clone>(items: &[T], pagination: Option<Pagination>) -> Vec<T> {
    match pagination {
        Some(p) => {
            let (start, end) = p.window(items.len());
            items[start..end].to_vec()
        },
        None => items.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(size: u64, n: i64) -> Option<Pagination> {
        Some(Pagination {
            page_size: size,
            this_page: n,
        })
    }

    #[test]
    fn test_positive_pages() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(paginate(&items, page(3, 1)), vec![1, 2, 3]);
        assert_eq!(paginate(&items, page(3, 2)), vec![4, 5, 6]);
        assert_eq!(paginate(&items, page(3, 4)), vec![10]);
        assert!(paginate(&items, page(3, 5)).is_empty());
    }

    #[test]
    fn test_negative_pages_count_from_end() {
        let items: Vec<u32> = (1..=10).collect();
        assert_eq!(paginate(&items, page(3, -1)), vec![8, 9, 10]);
        assert_eq!(paginate(&items, page(3, -2)), vec![5, 6, 7]);
    }

    #[test]
    fn test_negative_start_past_the_front() {
        let items: Vec<u32> = (1..=10).collect();
        // start = -2 resolves to 8, end = 1: nothing between them
        assert!(paginate(&items, page(3, -4)).is_empty());
        // start = -5 resolves to 5, end = -2 resolves to 8
        assert_eq!(paginate(&items, page(3, -5)), vec![6, 7, 8]);
        // start = -11 resolves to 0, end = -8 resolves to 2
        assert_eq!(paginate(&items, page(3, -7)), vec![1, 2]);
        assert_eq!(paginate(&items, page(20, -1)), items);
    }

    #[test]
    fn test_missing_args_are_noop() {
        let items = vec![1, 2, 3];
        assert_eq!(paginate(&items, None), items);
        assert_eq!(Pagination::from_values(None, Some(&json!(1))), None);
        assert_eq!(Pagination::from_values(Some(&json!(2)), Some(&json!(0))), None);
        assert_eq!(Pagination::from_values(Some(&json!(0)), Some(&json!(1))), None);
        assert_eq!(Pagination::from_values(Some(&json!("x")), Some(&json!(1))), None);
    }

    #[test]
    fn test_from_values_accepts_numeric_strings() {
        assert_eq!(
            Pagination::from_values(Some(&json!("5")), Some(&json!("-2"))),
            page(5, -2)
        );
    }
}
