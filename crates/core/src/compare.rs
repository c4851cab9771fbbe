//! Cell value comparison for sorting
//!
//! Display text such as `$1,200.00` is stripped of currency and grouping
//! symbols and compared numerically when it parses to a truthy number.
//! Each side is converted on its own, so a number can end up compared with
//! text. A parse result of zero is falsy and is never converted: `"0"`
//! compares as the string `"0"`.

use crate::parser::{parse_float, to_number};
use std::cmp::Ordering;

/// Symbols removed before a value is parsed
const STRIPPED: [char; 2] = ['$', ','];

/// A display value resolved for comparison
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Resolve a cell's display text into its comparison form
    pub fn from_display(text: &str) -> Self {
        let stripped: String = text.chars().filter(|c| !STRIPPED.contains(c)).collect();
        let parsed = parse_float(&stripped);

        // zero and NaN are falsy: keep the text
        if parsed != 0.0 && !parsed.is_nan() {
            SortKey::Number(parsed)
        } else {
            SortKey::Text(stripped)
        }
    }

    fn as_number(&self) -> f64 {
        match self {
            SortKey::Number(n) => *n,
            SortKey::Text(t) => to_number(t),
        }
    }
}

/// Compare two resolved keys.
///
/// This is not a total order: a number compared with non-numeric text is
/// `Equal`, while the text may still order against other text.
pub fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => {
            let (x, y) = (a.as_number(), b.as_number());
            if x < y {
                Ordering::Less
            } else if x > y {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
    }
}

/// Compare two display strings
pub fn compare_values(a: &str, b: &str) -> Ordering {
    compare_keys(&SortKey::from_display(a), &SortKey::from_display(b))
}

/// Compare two display strings, returning -1, 0 or 1
pub fn compare_sign(a: &str, b: &str) -> i32 {
    match compare_values(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
