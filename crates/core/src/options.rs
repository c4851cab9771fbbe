//! Multi-select option filter
//!
//! A filter form holds one select per column. A row stays visible only when
//! every participating select is either `all` or equal to the row's text at
//! that select's column. Selects marked for generation are filled from the
//! distinct values observed in a source table.

use crate::markers;
use crate::page::{Display, FilterControl, Page, Row, SelectOption, Table};
use std::collections::BTreeSet;
use tracing::debug;

/// Texts of the source table's cells tagged with `data-col = col`
pub fn column_values(table: &Table, col: usize) -> Vec<String> {
    table
        .body
        .iter()
        .flat_map(|r| r.cells.iter())
        .filter(|c| c.col == Some(col))
        .map(|c| c.text.clone())
        .collect()
}

/// Distinct values in ascending order
pub fn unique_sorted<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    values
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fill the generated selects of a form from its options source.
///
/// Each generated filter gets one option per distinct value and joins the
/// participating filters. Returns the number of options added.
pub fn generate_options(page: &mut Page, form_id: &str) -> usize {
    let Some(form) = page.filter_form(form_id) else {
        debug!(form = form_id, "Filter form not found");
        return 0;
    };
    let Some(source) = form.options_source.as_deref().and_then(|id| page.table(id)) else {
        debug!(form = form_id, "Filter form has no options source");
        return 0;
    };

    let generated: Vec<(usize, Vec<String>)> = form
        .filters
        .iter()
        .enumerate()
        .filter(|(_, f)| f.wants_generated_options())
        .map(|(index, f)| (index, unique_sorted(column_values(source, f.col))))
        .collect();

    let Some(form) = page.filter_form_mut(form_id) else {
        return 0;
    };

    let mut added = 0;
    for (index, values) in generated {
        let filter = &mut form.filters[index];
        added += values.len();
        filter
            .select
            .options
            .extend(values.iter().map(|v| SelectOption::new(v)));
        filter.classes.add(markers::FILTER_SELECT);
    }

    debug!(form = form_id, added, "Generated filter options");
    added
}

/// Whether a row passes every participating filter
pub fn row_passes(row: &Row, filters: &[FilterControl]) -> bool {
    filters
        .iter()
        .filter(|f| f.is_participating() && !f.select.is_all())
        .all(|f| row.text_at(f.col) == Some(f.select.value.as_str()))
}

/// Show or hide every row of a form's row set. Returns the visible count.
pub fn apply_filters(page: &mut Page, form_id: &str) -> usize {
    let Some(form) = page.filter_form(form_id).cloned() else {
        debug!(form = form_id, "Filter form not found");
        return 0;
    };
    let Some(table) = page.table_mut(&form.rows.table) else {
        debug!(form = form_id, table = %form.rows.table, "Filter rows table not found");
        return 0;
    };

    let mut visible = 0;
    for row in table.body.iter_mut().filter(|r| form.rows.matches(r)) {
        if row_passes(row, &form.filters) {
            row.display = Display::TableRow;
            visible += 1;
        } else {
            row.display = Display::None;
        }
    }

    debug!(form = form_id, visible, "Applied option filters");
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Cell, FilterForm, RowId, RowSelector};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn region_row(region: &str, year: &str) -> Row {
        Row::new(vec![
            Cell::label(region).with_col(0),
            Cell::label(year).with_col(1),
            Cell::data("$1.00", "1"),
        ])
    }

    fn page() -> Page {
        let mut page = Page::new();
        page.tables.push(Table::new(
            "sales",
            vec![Cell::label("Region"), Cell::label("Year"), Cell::label("Total")],
            vec![
                region_row("EU", "2024"),
                region_row("EU", "2023"),
                region_row("US", "2024"),
                region_row("APAC", "2024"),
                region_row("EU", "2024"),
            ],
        ));
        page.filter_forms.push(FilterForm {
            id: "filters".to_string(),
            rows: RowSelector::table("sales"),
            options_source: Some("sales".to_string()),
            filters: vec![FilterControl::generated(0), FilterControl::generated(1)],
        });
        page.assign_row_ids();
        page
    }

    fn set(page: &mut Page, filter: usize, value: &str) -> BTreeSet<RowId> {
        page.filter_form_mut("filters").unwrap().filters[filter].select.value = value.to_string();
        apply_filters(page, "filters");
        page.table("sales").unwrap().visible_rows().into_iter().collect()
    }

    fn option_values(page: &Page, filter: usize) -> Vec<String> {
        page.filter_form("filters").unwrap().filters[filter]
            .select
            .options
            .iter()
            .map(|o| o.value.clone())
            .collect()
    }

    #[test]
    fn test_unique_sorted() {
        let values = ["b", "a", "a", "c"].map(str::to_string);
        assert_eq!(unique_sorted(values), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_generate_options() {
        let mut page = page();

        assert_eq!(generate_options(&mut page, "filters"), 5);
        assert_eq!(option_values(&page, 0), vec!["all", "APAC", "EU", "US"]);
        assert_eq!(option_values(&page, 1), vec!["all", "2023", "2024"]);

        let form = page.filter_form("filters").unwrap();
        assert!(form.filters.iter().all(FilterControl::is_participating));
    }

    #[test]
    fn test_and_composition() {
        let mut page = page();
        generate_options(&mut page, "filters");

        let eu = set(&mut page, 0, "EU");
        let eu_2024 = set(&mut page, 1, "2024");
        assert_eq!(eu_2024, BTreeSet::from([RowId(1), RowId(5)]));

        // relaxing either constraint never shrinks the visible set
        let year_relaxed = set(&mut page, 1, "all");
        assert_eq!(year_relaxed, eu);
        assert!(eu_2024.is_subset(&year_relaxed));

        set(&mut page, 1, "2024");
        let region_relaxed = set(&mut page, 0, "all");
        assert_eq!(
            region_relaxed,
            BTreeSet::from([RowId(1), RowId(3), RowId(4), RowId(5)])
        );
        assert!(eu_2024.is_subset(&region_relaxed));
    }

    #[test]
    fn test_all_sentinel_shows_everything() {
        let mut page = page();
        generate_options(&mut page, "filters");

        let visible = set(&mut page, 0, "all");
        assert_eq!(visible.len(), 5);
    }

    #[test]
    fn test_non_participating_filters_are_ignored() {
        let mut page = page();
        // options never generated: filters are not participating yet
        let visible = set(&mut page, 0, "US");
        assert_eq!(visible.len(), 5);
    }

    #[test]
    fn test_missing_cell_fails_active_constraint() {
        let row = Row::new(vec![Cell::label("EU")]);
        let mut filter = FilterControl::new(3);
        assert!(row_passes(&row, std::slice::from_ref(&filter)));

        filter.select.value = "x".to_string();
        assert!(!row_passes(&row, &[filter]));
    }
}
