//! Comparison chart controller
//!
//! Checkbox selections on a table decide which rows become series of the
//! comparison chart. Every change destroys the chart and builds a new one
//! from the live table: categories from the header's data cells, one series
//! per active row in display order.
//!
//! Selections are kept per source table, so two blocks charting the same
//! table always agree.

use crate::chart::{comparison_options, ChartHandle, ChartRenderer, RenderTarget, Series};
use crate::config::EnhanceConfig;
use crate::markers;
use crate::page::{Page, RowId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug)]
pub struct ComparisonController {
    default_rows: usize,
    value_prefix: String,
    axis_description: String,
    /// Active rows keyed by source table id
    selections: BTreeMap<String, BTreeSet<RowId>>,
    /// Live chart keyed by block id
    charts: BTreeMap<String, ChartHandle>,
    next_container: u64,
}

impl ComparisonController {
    pub fn new(config: &EnhanceConfig) -> Self {
        Self {
            default_rows: config.compare_default_rows,
            value_prefix: config.value_prefix.clone(),
            axis_description: config.x_axis_description.clone(),
            selections: BTreeMap::new(),
            charts: BTreeMap::new(),
            next_container: 0,
        }
    }

    /// Active rows of a table
    pub fn active(&self, table_id: &str) -> BTreeSet<RowId> {
        self.selections.get(table_id).cloned().unwrap_or_default()
    }

    /// Live chart of a block
    pub fn chart(&self, block_id: &str) -> Option<ChartHandle> {
        self.charts.get(block_id).copied()
    }

    /// Select the default rows of every charted table, then render
    pub fn setup<R: ChartRenderer + ?Sized>(&mut self, page: &mut Page, renderer: &mut R) {
        self.default_selection(page);
        self.render_all(page, renderer);
    }

    /// Activate the first rows carrying a checkbox in each charted table
    pub fn default_selection(&mut self, page: &mut Page) {
        let tables: BTreeSet<String> = page
            .compare_blocks
            .iter()
            .map(|b| b.compare.clone())
            .collect();

        for table_id in tables {
            let Some(table) = page.table_mut(&table_id) else {
                continue;
            };
            let selection = self.selections.entry(table_id.clone()).or_default();

            for row in table
                .body
                .iter_mut()
                .filter(|r| r.checkbox().is_some())
                .take(self.default_rows)
            {
                selection.insert(row.id);
                row.classes.add(markers::COMPARE_ACTIVE);
                if let Some(checkbox) = row.checkbox_mut() {
                    checkbox.checked = true;
                }
            }

            debug!(table = %table_id, active = selection.len(), "Applied default comparison selection");
        }
    }

    /// Flip a row's membership in its table's selection and its active marker.
    ///
    /// Does not re-render. Returns whether the row is active afterwards, or
    /// `None` when the row does not exist.
    pub fn toggle_row_active(&mut self, page: &mut Page, row_id: RowId) -> Option<bool> {
        let table = page.tables.iter_mut().find(|t| t.row(row_id).is_some())?;
        let selection = self.selections.entry(table.id.clone()).or_default();
        let row = table.row_mut(row_id)?;

        let active = if selection.remove(&row_id) {
            false
        } else {
            selection.insert(row_id);
            true
        };

        if active {
            row.classes.add(markers::COMPARE_ACTIVE);
        } else {
            row.classes.remove(markers::COMPARE_ACTIVE);
        }
        if let Some(checkbox) = row.checkbox_mut() {
            checkbox.checked = active;
        }

        debug!(row = %row_id, active, "Toggled comparison row");
        Some(active)
    }

    /// Series of the active rows of a table, in display order
    pub fn series(&self, page: &Page, table_id: &str) -> Vec<Series> {
        let Some(table) = page.table(table_id) else {
            return Vec::new();
        };
        let Some(selection) = self.selections.get(table_id) else {
            return Vec::new();
        };

        table
            .body
            .iter()
            .filter(|r| selection.contains(&r.id))
            .map(|r| Series {
                name: r.label_name(),
                data: r.series(),
            })
            .collect()
    }

    /// Replace a block's chart with a fresh one built from its table
    pub fn render<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
        block_id: &str,
    ) -> Option<ChartHandle> {
        self.destroy_chart(page, renderer, block_id);

        let table_id = page.compare_block(block_id)?.compare.clone();
        let categories = page.table(&table_id)?.categories();
        let series = self.series(page, &table_id);

        self.next_container += 1;
        let container = format!("container-{}", self.next_container);
        if let Some(block) = page.compare_blocks.iter_mut().find(|b| b.id == block_id) {
            block.graph = Some(container.clone());
        }

        let options = comparison_options(
            &categories,
            &series,
            &self.value_prefix,
            &self.axis_description,
        );
        let handle = renderer.render(RenderTarget::Id(container.clone()), options);
        self.charts.insert(block_id.to_string(), handle);

        debug!(block = block_id, %container, series = series.len(), "Rendered comparison chart");
        Some(handle)
    }

    pub fn render_all<R: ChartRenderer + ?Sized>(&mut self, page: &mut Page, renderer: &mut R) {
        let blocks: Vec<String> = page.compare_blocks.iter().map(|b| b.id.clone()).collect();
        for block in blocks {
            self.render(page, renderer, &block);
        }
    }

    /// Re-render the blocks charting `table_id`
    pub fn render_for_table<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
        table_id: &str,
    ) {
        let blocks: Vec<String> = page
            .compare_blocks
            .iter()
            .filter(|b| b.compare == table_id)
            .map(|b| b.id.clone())
            .collect();
        for block in blocks {
            self.render(page, renderer, &block);
        }
    }

    fn destroy_chart<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
        block_id: &str,
    ) {
        if let Some(handle) = self.charts.remove(block_id) {
            renderer.destroy(handle);
        }
        if let Some(block) = page.compare_blocks.iter_mut().find(|b| b.id == block_id) {
            block.graph = None;
        }
    }

    /// Remove every block's chart and container
    pub fn clear_charts<R: ChartRenderer + ?Sized>(&mut self, page: &mut Page, renderer: &mut R) {
        let blocks: Vec<String> = page.compare_blocks.iter().map(|b| b.id.clone()).collect();
        for block in blocks {
            self.destroy_chart(page, renderer, &block);
        }
    }

    /// Remove charts, uncheck every checkbox and empty every selection
    pub fn reset<R: ChartRenderer + ?Sized>(&mut self, page: &mut Page, renderer: &mut R) {
        self.clear_charts(page, renderer);
        self.selections.clear();

        for row in page.tables.iter_mut().flat_map(|t| t.body.iter_mut()) {
            row.classes.remove(markers::COMPARE_ACTIVE);
            if let Some(checkbox) = row.checkbox_mut() {
                checkbox.checked = false;
            }
        }
    }

    /// Flip the page-level comparison visibility and rebuild from defaults.
    ///
    /// Returns the new visibility.
    pub fn toggle_visibility<R: ChartRenderer + ?Sized>(
        &mut self,
        page: &mut Page,
        renderer: &mut R,
    ) -> bool {
        page.compare_enabled = !page.compare_enabled;
        self.reset(page, renderer);
        self.setup(page, renderer);

        info!(enabled = page.compare_enabled, "Toggled comparison charts");
        page.compare_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::RecordingRenderer;
    use crate::page::{Cell, CompareBlock, Row, Table};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(rows: usize) -> Page {
        let body = (1..=rows)
            .map(|i| {
                Row::new(vec![
                    Cell::checkbox(),
                    Cell::label(&format!("Team {}", i)),
                    Cell::label("EC2"),
                    Cell::data("$1.00", &format!("{}.001", i)),
                    Cell::data("$2.00", &format!("{}.5", i)),
                ])
            })
            .collect();
        let mut page = Page::new();
        page.tables.push(Table::new(
            "costs",
            vec![
                Cell::plain(""),
                Cell::label("Team"),
                Cell::label("Service"),
                Cell::data("2024-01", "").with_class(markers::DATA_CELL),
                Cell::data("2024-02", "").with_class(markers::DATA_CELL),
            ],
            body,
        ));
        page.compare_blocks.push(CompareBlock {
            id: "cmp".to_string(),
            compare: "costs".to_string(),
            graph: None,
        });
        page.assign_row_ids();
        page
    }

    fn series_names(renderer: &RecordingRenderer, handle: ChartHandle) -> Vec<String> {
        renderer.get(handle).unwrap().options["series"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_setup_selects_first_five() {
        let mut page = page(8);
        let mut renderer = RecordingRenderer::new();
        let mut controller = ComparisonController::new(&EnhanceConfig::default());

        controller.setup(&mut page, &mut renderer);

        let expected: BTreeSet<RowId> = (1..=5).map(RowId).collect();
        assert_eq!(controller.active("costs"), expected);

        let handle = controller.chart("cmp").unwrap();
        assert_eq!(
            series_names(&renderer, handle),
            vec![
                "Team 1 EC2",
                "Team 2 EC2",
                "Team 3 EC2",
                "Team 4 EC2",
                "Team 5 EC2"
            ]
        );

        let options = &renderer.get(handle).unwrap().options;
        assert_eq!(options["xAxis"]["categories"], json!(["2024-01", "2024-02"]));
        assert_eq!(options["series"][1]["data"], json!([2.0, 2.5]));
        assert_eq!(page.compare_block("cmp").unwrap().graph.as_deref(), Some("container-1"));

        let row = page.row(RowId(1)).unwrap();
        assert!(row.classes.contains(markers::COMPARE_ACTIVE));
        assert!(row.checkbox().unwrap().checked);
        assert!(!page.row(RowId(6)).unwrap().checkbox().unwrap().checked);
    }

    #[test]
    fn test_toggle_adds_and_removes_one_series() {
        let mut page = page(8);
        let mut renderer = RecordingRenderer::new();
        let mut controller = ComparisonController::new(&EnhanceConfig::default());
        controller.setup(&mut page, &mut renderer);

        assert_eq!(controller.toggle_row_active(&mut page, RowId(7)), Some(true));
        let handle = controller.render(&mut page, &mut renderer, "cmp").unwrap();
        let names = series_names(&renderer, handle);
        assert_eq!(names.len(), 6);
        assert_eq!(names[5], "Team 7 EC2");
        assert_eq!(
            renderer.get(handle).unwrap().options["series"][5]["data"],
            json!([7.0, 7.5])
        );

        assert_eq!(controller.toggle_row_active(&mut page, RowId(7)), Some(false));
        let handle = controller.render(&mut page, &mut renderer, "cmp").unwrap();
        assert_eq!(series_names(&renderer, handle).len(), 5);
        assert!(!page.row(RowId(7)).unwrap().classes.contains(markers::COMPARE_ACTIVE));

        // each render replaced the previous chart
        assert_eq!(renderer.live(), 1);
    }

    #[test]
    fn test_series_follow_display_order() {
        let mut page = page(3);
        let mut renderer = RecordingRenderer::new();
        let mut controller = ComparisonController::new(&EnhanceConfig::default());
        controller.setup(&mut page, &mut renderer);

        page.table_mut("costs").unwrap().body.reverse();
        let handle = controller.render(&mut page, &mut renderer, "cmp").unwrap();
        assert_eq!(
            series_names(&renderer, handle),
            vec!["Team 3 EC2", "Team 2 EC2", "Team 1 EC2"]
        );
    }

    #[test]
    fn test_visibility_cycle_restores_defaults() {
        let mut page = page(8);
        let mut renderer = RecordingRenderer::new();
        let mut controller = ComparisonController::new(&EnhanceConfig::default());

        assert!(controller.toggle_visibility(&mut page, &mut renderer));
        controller.toggle_row_active(&mut page, RowId(1));
        controller.toggle_row_active(&mut page, RowId(2));
        controller.toggle_row_active(&mut page, RowId(8));

        assert!(!controller.toggle_visibility(&mut page, &mut renderer));
        assert!(controller.toggle_visibility(&mut page, &mut renderer));

        let expected: BTreeSet<RowId> = (1..=5).map(RowId).collect();
        assert_eq!(controller.active("costs"), expected);
        let row = page.row(RowId(8)).unwrap();
        assert!(!row.classes.contains(markers::COMPARE_ACTIVE));
        assert!(!row.checkbox().unwrap().checked);
        assert_eq!(renderer.live(), 1);
    }

    #[test]
    fn test_empty_selection_renders_no_series() {
        let mut page = page(2);
        let mut renderer = RecordingRenderer::new();
        let mut controller = ComparisonController::new(&EnhanceConfig::default());
        controller.setup(&mut page, &mut renderer);

        controller.toggle_row_active(&mut page, RowId(1));
        controller.toggle_row_active(&mut page, RowId(2));
        let handle = controller.render(&mut page, &mut renderer, "cmp").unwrap();

        assert_eq!(renderer.get(handle).unwrap().options["series"], json!([]));
    }

    #[test]
    fn test_unknown_row_is_ignored() {
        let mut page = page(2);
        let mut controller = ComparisonController::new(&EnhanceConfig::default());
        assert_eq!(controller.toggle_row_active(&mut page, RowId(99)), None);
    }
}
