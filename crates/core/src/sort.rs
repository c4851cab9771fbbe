//! Table sort engine
//!
//! Each header cell remembers its own direction and cycles
//! `unset -> ascending -> descending -> ascending`. Only one header per table
//! carries the `sorted` marker; moving it does not forget the other headers'
//! directions.

use crate::compare::{compare_keys, SortKey};
use crate::markers;
use crate::page::{Row, Table};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl Direction {
    /// Direction applied on the next activation of a header
    pub fn next(current: Option<Direction>) -> Direction {
        match current {
            None | Some(Direction::Descending) => Direction::Ascending,
            Some(Direction::Ascending) => Direction::Descending,
        }
    }

    /// Value written to `data-sortdir`
    pub fn as_attr(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Sort state of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSortState {
    directions: HashMap<usize, Direction>,
    sorted: Option<usize>,
}

impl TableSortState {
    pub fn direction(&self, column: usize) -> Option<Direction> {
        self.directions.get(&column).copied()
    }

    /// Header currently marked as sorted
    pub fn sorted_column(&self) -> Option<usize> {
        self.sorted
    }
}

/// Sort state of every sortable table, keyed by table id
#[derive(Debug, Default)]
pub struct SortEngine {
    tables: HashMap<String, TableSortState>,
}

impl SortEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, table_id: &str) -> Option<&TableSortState> {
        self.tables.get(table_id)
    }

    /// Activate a header cell: resolve its next direction, reorder the body
    /// and move the `sorted` marker.
    ///
    /// Returns `None` when the column has no header cell.
    pub fn activate(&mut self, table: &mut Table, column: usize) -> Option<Direction> {
        if column >= table.header.len() {
            debug!(table = %table.id, column, "Ignoring sort on missing header cell");
            return None;
        }

        let state = self.tables.entry(table.id.clone()).or_default();
        let direction = Direction::next(state.direction(column));
        state.directions.insert(column, direction);
        state.sorted = Some(column);

        sort_rows(&mut table.body, column, direction);

        for (index, th) in table.header.iter_mut().enumerate() {
            if index == column {
                th.classes.add(markers::SORTED);
                th.sort_dir = Some(direction);
            } else {
                th.classes.remove(markers::SORTED);
            }
        }

        debug!(
            table = %table.id,
            column,
            direction = direction.as_attr(),
            rows = table.body.len(),
            "Sorted table"
        );

        Some(direction)
    }
}

/// Reorder rows by the display text at `column`.
///
/// Rows are stable-sorted ascending and reversed for a descending sort.
/// Rows without a cell at `column` sort as empty text.
pub fn sort_rows(rows: &mut Vec<Row>, column: usize, direction: Direction) {
    let keyed: Vec<(SortKey, Row)> = rows
        .drain(..)
        .map(|row| (SortKey::from_display(row.text_at(column).unwrap_or("")), row))
        .collect();

    let mut sorted = stable_sort_by(keyed, |a, b| compare_keys(&a.0, &b.0));
    if direction == Direction::Descending {
        sorted.reverse();
    }

    rows.extend(sorted.into_iter().map(|(_, row)| row));
}

/// Stable merge sort that tolerates comparators which are not a total order.
///
/// Mixed number/text keys can be intransitive, which the standard library
/// sorts are allowed to panic on.
fn stable_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}
