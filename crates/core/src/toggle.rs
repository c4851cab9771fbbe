//! Column visibility toggling

use crate::page::{Display, Page};
use tracing::debug;

/// Flip every cell carrying `marker_class` between hidden and `table-cell`.
///
/// An unset display counts as hidden, so the first toggle of a cell without
/// an inline style shows it. Returns the number of cells flipped.
pub fn toggle_column(page: &mut Page, marker_class: &str) -> usize {
    let mut flipped = 0;

    for cell in page.cells_mut().filter(|c| c.classes.contains(marker_class)) {
        cell.display = match cell.display {
            Display::None | Display::Unset => Display::TableCell,
            _ => Display::None,
        };
        flipped += 1;
    }

    debug!(marker_class, flipped, "Toggled column visibility");
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Cell, Row, Table};

    fn page() -> Page {
        let mut page = Page::new();
        page.tables.push(Table::new(
            "t",
            vec![
                Cell::label("Name"),
                Cell::label("Detail").with_class("extra"),
                Cell::label("Other").with_class("more"),
            ],
            vec![Row::new(vec![
                Cell::label("a"),
                Cell::plain("detail").with_class("extra"),
                Cell::plain("other").with_class("more"),
            ])],
        ));
        page
    }

    fn displays(page: &Page, col: usize) -> Vec<Display> {
        let table = &page.tables[0];
        vec![table.header[col].display, table.body[0].cells[col].display]
    }

    #[test]
    fn test_unset_toggles_to_visible_then_hidden() {
        let mut page = page();

        assert_eq!(toggle_column(&mut page, "extra"), 2);
        assert_eq!(displays(&page, 1), vec![Display::TableCell; 2]);

        toggle_column(&mut page, "extra");
        assert_eq!(displays(&page, 1), vec![Display::None; 2]);

        toggle_column(&mut page, "extra");
        assert_eq!(displays(&page, 1), vec![Display::TableCell; 2]);
    }

    #[test]
    fn test_togglers_are_independent() {
        let mut page = page();

        toggle_column(&mut page, "extra");
        assert_eq!(displays(&page, 2), vec![Display::Unset; 2]);
        assert_eq!(displays(&page, 0), vec![Display::Unset; 2]);
    }

    #[test]
    fn test_unknown_class_is_a_no_op() {
        let mut page = page();
        assert_eq!(toggle_column(&mut page, "missing"), 0);
    }
}
