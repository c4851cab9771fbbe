//! Page bootstrap and event dispatch
//!
//! [`Enhancer::ready`] wires every component to the elements carrying its
//! marker, the way a page-ready hook would. [`Enhancer::dispatch`] then
//! delivers user events to whatever handlers were bound to their target.
//! Components never talk to each other; the live page is the only shared
//! state.

use crate::chart::ChartRenderer;
use crate::comparison::ComparisonController;
use crate::config::EnhanceConfig;
use crate::filter::apply_choice;
use crate::lifecycle::{Handler, Lifecycles, Listeners, Resource, Target};
use crate::options::{apply_filters, generate_options};
use crate::page::{Page, RowId};
use crate::sort::SortEngine;
use crate::sparkline::{SparklineRenderer, Tick};
use crate::toggle::toggle_column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A user interaction with the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Event {
    /// Click on a header cell
    HeaderClick { table: String, column: usize },
    /// Click on a column toggler
    TogglerClick { toggler: String },
    /// Selection of a choice filter radio
    ChoiceChange { control: String },
    /// New value picked in a filter form select
    FilterChange {
        form: String,
        filter: usize,
        value: String,
    },
    /// Click on a row's comparison checkbox
    CompareItemClick { row: RowId },
    /// Click on a comparison show/hide toggler
    CompareToggle { toggler: String },
}

impl Event {
    pub fn target(&self) -> Target {
        match self {
            Event::HeaderClick { table, column } => Target::Header {
                table: table.clone(),
                column: *column,
            },
            Event::TogglerClick { toggler } => Target::Toggler(toggler.clone()),
            Event::ChoiceChange { control } => Target::Choice(control.clone()),
            Event::FilterChange { form, filter, .. } => Target::FilterSelect {
                form: form.clone(),
                filter: *filter,
            },
            Event::CompareItemClick { row } => Target::CompareItem(*row),
            Event::CompareToggle { toggler } => Target::CompareToggler(toggler.clone()),
        }
    }
}

pub struct Enhancer<R: ChartRenderer> {
    config: EnhanceConfig,
    renderer: R,
    listeners: Listeners,
    lifecycles: Lifecycles,
    sort: SortEngine,
    comparison: ComparisonController,
    sparklines: SparklineRenderer,
}

impl<R: ChartRenderer> Enhancer<R> {
    pub fn new(config: EnhanceConfig, renderer: R) -> Self {
        Self {
            comparison: ComparisonController::new(&config),
            sparklines: SparklineRenderer::new(config.sparkline_batch_size),
            config,
            renderer,
            listeners: Listeners::new(),
            lifecycles: Lifecycles::new(),
            sort: SortEngine::new(),
        }
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn lifecycles(&self) -> &Lifecycles {
        &self.lifecycles
    }

    pub fn sort(&self) -> &SortEngine {
        &self.sort
    }

    pub fn comparison(&self) -> &ComparisonController {
        &self.comparison
    }

    pub fn sparklines(&self) -> &SparklineRenderer {
        &self.sparklines
    }

    /// Wire every component to the page. Safe to call again after the page
    /// gains new elements: already wired elements are skipped.
    pub fn ready(&mut self, page: &mut Page) {
        let before = self.listeners.len();

        self.wire_togglers(page);
        self.wire_choices(page);
        self.wire_sorting(page);
        self.generate_filter_options(page);
        self.wire_option_filters(page);
        self.wire_comparison(page);
        self.start_sparklines();

        info!(
            bound = self.listeners.len() - before,
            total = self.listeners.len(),
            "Page ready"
        );
    }

    /// Deliver an event: apply the control's own state change, then run the
    /// handlers bound to its target. Returns the number of handlers run.
    pub fn dispatch(&mut self, page: &mut Page, event: &Event) -> usize {
        match event {
            Event::FilterChange {
                form,
                filter,
                value,
            } => {
                if let Some(control) = page
                    .filter_form_mut(form)
                    .and_then(|f| f.filters.get_mut(*filter))
                {
                    control.select.value = value.clone();
                }
            }
            Event::ChoiceChange { control } => {
                let group = page
                    .choices
                    .iter()
                    .find(|c| &c.id == control)
                    .map(|c| c.name.clone());
                if let Some(group) = group {
                    for choice in page.choices.iter_mut().filter(|c| c.name == group) {
                        choice.checked = &choice.id == control;
                    }
                }
            }
            Event::CompareItemClick { row } => {
                if let Some(checkbox) = page.row_mut(*row).and_then(|r| r.checkbox_mut()) {
                    checkbox.checked = !checkbox.checked;
                }
            }
            Event::HeaderClick { .. } | Event::TogglerClick { .. } | Event::CompareToggle { .. } => {}
        }

        self.fire(page, &event.target())
    }

    /// Run one sparkline timer tick
    pub fn tick_sparklines(&mut self, page: &mut Page) -> Tick {
        self.sparklines.tick(page, &mut self.renderer)
    }

    /// Tick the sparkline loop until it finishes, returning the ticks run
    pub fn drain_sparklines(&mut self, page: &mut Page) -> usize {
        self.sparklines.run_to_completion(page, &mut self.renderer)
    }

    fn fire(&mut self, page: &mut Page, target: &Target) -> usize {
        let handlers = self.listeners.handlers(target).to_vec();
        if handlers.is_empty() {
            debug!(?target, "No listeners bound");
        }
        for handler in &handlers {
            self.run(page, target, *handler);
        }
        handlers.len()
    }

    fn run(&mut self, page: &mut Page, target: &Target, handler: Handler) {
        match (handler, target) {
            (Handler::SortColumn, Target::Header { table, column }) => {
                if let Some(table) = page.table_mut(table) {
                    self.sort.activate(table, *column);
                }
            }
            (Handler::ToggleColumn, Target::Toggler(id)) => {
                let class = page
                    .togglers
                    .iter()
                    .find(|t| &t.id == id)
                    .map(|t| t.toggle.clone());
                if let Some(class) = class {
                    toggle_column(page, &class);
                }
            }
            (Handler::ChoiceFilter, Target::Choice(id)) => {
                if let Some(control) = page.choices.iter().find(|c| &c.id == id).cloned() {
                    apply_choice(page, &control);
                }
            }
            (Handler::OptionFilter, Target::FilterSelect { form, .. }) => {
                apply_filters(page, form);
            }
            (Handler::CompareMarkRow, Target::CompareItem(row)) => {
                self.comparison.toggle_row_active(page, *row);
            }
            (Handler::CompareRedraw, Target::CompareItem(row)) => {
                let table = page
                    .tables
                    .iter()
                    .find(|t| t.row(*row).is_some())
                    .map(|t| t.id.clone());
                if let Some(table) = table {
                    self.comparison
                        .render_for_table(page, &mut self.renderer, &table);
                }
            }
            (Handler::CompareVisibility, Target::CompareToggler(_)) => {
                self.comparison.toggle_visibility(page, &mut self.renderer);
            }
            (handler, target) => {
                debug!(?handler, ?target, "Handler does not apply to target");
            }
        }
    }

    fn wire_togglers(&mut self, page: &Page) {
        for toggler in &page.togglers {
            if !self.lifecycles.begin(Resource::Toggler(toggler.id.clone())) {
                continue;
            }
            self.listeners
                .add(Target::Toggler(toggler.id.clone()), Handler::ToggleColumn);
            self.lifecycles.finish(Resource::Toggler(toggler.id.clone()));
        }
    }

    fn wire_choices(&mut self, page: &Page) {
        for choice in &page.choices {
            if !self.lifecycles.begin(Resource::Choice(choice.id.clone())) {
                continue;
            }
            self.listeners
                .add(Target::Choice(choice.id.clone()), Handler::ChoiceFilter);
            self.lifecycles.finish(Resource::Choice(choice.id.clone()));
        }
    }

    /// Bind every header cell of sortable tables, then activate the last
    /// header once for a deterministic initial order
    fn wire_sorting(&mut self, page: &mut Page) {
        let tables: Vec<(String, usize)> = page
            .tables
            .iter()
            .filter(|t| t.is_sortable())
            .map(|t| (t.id.clone(), t.header.len()))
            .collect();

        for (table, columns) in tables {
            let resource = Resource::SortableTable(table.clone());
            if !self.lifecycles.begin(resource.clone()) {
                continue;
            }

            for column in 0..columns {
                self.listeners.add(
                    Target::Header {
                        table: table.clone(),
                        column,
                    },
                    Handler::SortColumn,
                );
            }

            if let Some(last) = columns.checked_sub(1) {
                self.fire(
                    page,
                    &Target::Header {
                        table: table.clone(),
                        column: last,
                    },
                );
            }

            self.lifecycles.finish(resource);
        }
    }

    fn generate_filter_options(&mut self, page: &mut Page) {
        let forms: Vec<String> = page
            .filter_forms
            .iter()
            .filter(|f| f.options_source.is_some())
            .map(|f| f.id.clone())
            .collect();

        for form in forms {
            let resource = Resource::OptionsGenerator(form.clone());
            if !self.lifecycles.begin(resource.clone()) {
                continue;
            }
            generate_options(page, &form);
            self.lifecycles.finish(resource);
        }
    }

    fn wire_option_filters(&mut self, page: &Page) {
        for form in &page.filter_forms {
            let resource = Resource::FilterForm(form.id.clone());
            if !self.lifecycles.begin(resource.clone()) {
                continue;
            }

            for (index, filter) in form.filters.iter().enumerate() {
                if filter.is_participating() {
                    self.listeners.add(
                        Target::FilterSelect {
                            form: form.id.clone(),
                            filter: index,
                        },
                        Handler::OptionFilter,
                    );
                }
            }

            self.lifecycles.finish(resource);
        }
    }

    /// Bind checkboxes and togglers. The first time a charted table is wired
    /// the comparison state is cleared, and set up straight away when the
    /// page starts with comparisons enabled.
    fn wire_comparison(&mut self, page: &mut Page) {
        let tables: BTreeSet<String> = page
            .compare_blocks
            .iter()
            .map(|b| b.compare.clone())
            .collect();

        let mut fresh = false;
        for table_id in tables {
            let resource = Resource::CompareTable(table_id.clone());
            if self.lifecycles.begin(resource.clone()) {
                fresh = true;
                self.lifecycles.finish(resource);
            }

            let rows: Vec<RowId> = page
                .table(&table_id)
                .map(|t| {
                    t.body
                        .iter()
                        .filter(|r| r.checkbox().is_some())
                        .map(|r| r.id)
                        .collect()
                })
                .unwrap_or_default();

            // rows added after the first bootstrap get bound on the next one
            for row in rows {
                let resource = Resource::CompareItem(row);
                if !self.lifecycles.begin(resource.clone()) {
                    continue;
                }
                self.listeners
                    .add(Target::CompareItem(row), Handler::CompareMarkRow);
                self.listeners
                    .add(Target::CompareItem(row), Handler::CompareRedraw);
                self.lifecycles.finish(resource);
            }
        }

        for toggler in &page.compare_togglers {
            let resource = Resource::CompareToggler(toggler.id.clone());
            if !self.lifecycles.begin(resource.clone()) {
                continue;
            }
            self.listeners.add(
                Target::CompareToggler(toggler.id.clone()),
                Handler::CompareVisibility,
            );
            self.lifecycles.finish(resource);
        }

        if fresh {
            self.comparison.reset(page, &mut self.renderer);
            if page.compare_enabled {
                self.comparison.setup(page, &mut self.renderer);
            }
        }
    }

    fn start_sparklines(&mut self) {
        if self.lifecycles.begin(Resource::Sparklines) {
            self.sparklines.start();
            self.lifecycles.finish(Resource::Sparklines);
        }
    }
}
