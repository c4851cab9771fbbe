//! Choice filter: one control, one attribute-presence condition

use crate::page::{ChoiceControl, Display, Page};
use tracing::debug;

/// Apply a choice control to its rows.
///
/// With a `show` attribute every row matching `all` is hidden and the ones
/// that also carry the attribute are shown again. Without one, every row
/// matching `all` is shown. Returns the number of rows left visible.
pub fn apply_choice(page: &mut Page, control: &ChoiceControl) -> usize {
    let Some(table) = page.table_mut(&control.all.table) else {
        debug!(control = %control.id, table = %control.all.table, "Choice filter table not found");
        return 0;
    };

    let mut visible = 0;
    for row in table.body.iter_mut().filter(|r| control.all.matches(r)) {
        let show = match &control.show {
            Some(attribute) => row.attributes.contains_key(attribute),
            None => true,
        };
        row.display = if show { Display::TableRow } else { Display::None };
        if show {
            visible += 1;
        }
    }

    debug!(control = %control.id, show = ?control.show, visible, "Applied choice filter");
    visible
}
