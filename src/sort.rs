use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Arrow shown next to the active column header
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Which column the displayed rows are ordered by
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    /// State after a click on `column`
    ///
    /// Clicking the column that is currently ascending flips it to
    /// descending. Any other click (a new column, or the active column while
    /// descending) sorts ascending.
    ///
    /// # Examples
    /// ```
    /// use analyzer::sort::{SortDirection, SortState};
    ///
    /// let first = SortState::next(None, "age");
    /// assert_eq!(first.direction, SortDirection::Ascending);
    ///
    /// let second = SortState::next(Some(&first), "age");
    /// assert_eq!(second.direction, SortDirection::Descending);
    ///
    /// let other = SortState::next(Some(&second), "name");
    /// assert_eq!(other.direction, SortDirection::Ascending);
    /// ```
    pub fn next(current: Option<&SortState>, column: &str) -> SortState {
        let direction = match current {
            Some(s) if s.column == column && s.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };

        SortState {
            column: column.to_string(),
            direction,
        }
    }
}

/// Ordering of two cell values in the same column
pub trait CellComparator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Case-sensitive string order over UTF-16 code units
///
/// This is the order JavaScript's `<` gives, so the browser table and this
/// sorter agree. It differs from `str::cmp` (code-point order) only between
/// characters in U+E000..=U+FFFF and characters above U+FFFF.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lexical;

impl CellComparator for Lexical {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.encode_utf16().cmp(b.encode_utf16())
    }
}

/// Numbers first, ordered by value; everything else after, ordered lexically
///
/// `NaN` counts as text, which keeps the order total.
#[derive(Clone, Copy, Debug, Default)]
pub struct Numeric;

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

impl CellComparator for Numeric {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match (parse_number(a), parse_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Lexical.compare(a, b),
        }
    }
}

impl<F> CellComparator for F
where
    F: Fn(&str, &str) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self(a, b)
    }
}

/// Single-column sorter with per-column comparators
///
/// Columns without a registered comparator use [`Lexical`]. Sorting is
/// stable in both directions: rows whose cells compare equal keep the order
/// they had before the sort.
pub struct Sorter {
    default: Box<dyn CellComparator>,
    by_column: HashMap<String, Box<dyn CellComparator>>,
}

impl Default for Sorter {
    fn default() -> Self {
        Sorter {
            default: Box::new(Lexical),
            by_column: HashMap::new(),
        }
    }
}

impl Sorter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `comparator` for every column without its own
    pub fn with_default(mut self, comparator: impl CellComparator + 'static) -> Self {
        self.default = Box::new(comparator);
        self
    }

    /// Use `comparator` for `column` only
    pub fn with_column(
        mut self,
        column: impl Into<String>,
        comparator: impl CellComparator + 'static,
    ) -> Self {
        self.by_column.insert(column.into(), Box::new(comparator));
        self
    }

    pub fn comparator_for(&self, column: &str) -> &dyn CellComparator {
        self.by_column
            .get(column)
            .map(|c| &**c)
            .unwrap_or(&*self.default)
    }

    /// Reorder the rows of `dataset` in place
    ///
    /// An unknown column leaves the rows as they are.
    pub fn sort(&self, dataset: &mut Dataset, state: &SortState) {
        let Some(idx) = dataset.column_index(&state.column) else {
            return;
        };
        let cmp = self.comparator_for(&state.column);

        // Reverse the comparator rather than the result so ties stay put.
        dataset.rows_mut().sort_by(|a, b| {
            let ord = cmp.compare(&a[idx], &b[idx]);
            match state.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
}
