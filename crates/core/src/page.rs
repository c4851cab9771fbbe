//! Page snapshot: the tables and controls the host page hands over
//!
//! The snapshot stands in for the live document. Components read it, reorder
//! rows, flip `display` states and classes, and insert chart containers; they
//! never add or remove rows.

use crate::config::EnhanceConfig;
use crate::error::{Error, Result};
use crate::markers;
use crate::parser::precise_value;
use crate::sort::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Stable row identity, unchanged by sorting.
///
/// `0` marks a row that has not been assigned an id yet; ids are handed out
/// in document order when a page is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u32);

impl RowId {
    pub const UNASSIGNED: RowId = RowId(0);
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free set of class names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn add(&mut self, class: &str) {
        if !self.contains(class) {
            self.0.push(class.to_string());
        }
    }

    pub fn remove(&mut self, class: &str) {
        self.0.retain(|c| c != class);
    }

    /// Flip a class, returning whether it is present afterwards
    pub fn toggle(&mut self, class: &str) -> bool {
        if self.contains(class) {
            self.remove(class);
            false
        } else {
            self.add(class);
            true
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<const N: usize> From<[&str; N]> for ClassList {
    fn from(classes: [&str; N]) -> Self {
        let mut list = ClassList::new();
        for class in classes {
            list.add(class);
        }
        list
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Inline `display` style of a cell or row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Unset,
    None,
    TableCell,
    TableRow,
}

impl Display {
    pub fn is_unset(&self) -> bool {
        matches!(self, Display::Unset)
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, Display::None)
    }

    /// CSS value, if an inline style is set
    pub fn css(&self) -> Option<&'static str> {
        match self {
            Display::Unset => None,
            Display::None => Some("none"),
            Display::TableCell => Some("table-cell"),
            Display::TableRow => Some("table-row"),
        }
    }
}

/// What a cell holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Row or column label (`th`)
    Label,
    /// Numeric value with a precise source (`td.data-cell`, or a `th.data-cell` in the header)
    Data,
    /// Anything else (`td`)
    #[default]
    Plain,
}

/// Comparison checkbox inside a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkbox {
    #[serde(default)]
    pub checked: bool,
}

/// Sparkline placeholder inside a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    /// Loader children still inside the placeholder
    #[serde(default = "default_loaders")]
    pub loaders: usize,
    #[serde(default = "default_sparkline_classes")]
    pub classes: ClassList,
}

fn default_loaders() -> usize {
    1
}

fn default_sparkline_classes() -> ClassList {
    ClassList::from([markers::SPARKLINE, markers::SPARKLINE_LOADING])
}

impl Default for Sparkline {
    fn default() -> Self {
        Self {
            loaders: default_loaders(),
            classes: default_sparkline_classes(),
        }
    }
}

impl Sparkline {
    pub fn is_rendered(&self) -> bool {
        self.classes.contains(markers::SPARKLINE_DONE)
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Human-formatted display text
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub kind: CellKind,
    /// Precise numeric source, carried apart from the display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Column index the option generator matches on (`data-col`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<usize>,
    #[serde(default, skip_serializing_if = "ClassList::is_empty")]
    pub classes: ClassList,
    #[serde(default, skip_serializing_if = "Display::is_unset")]
    pub display: Display,
    /// Last direction applied from this header cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<Checkbox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparkline: Option<Sparkline>,
}

impl Cell {
    fn new(kind: CellKind, text: &str) -> Self {
        Self {
            text: text.to_string(),
            kind,
            value: None,
            col: None,
            classes: ClassList::new(),
            display: Display::Unset,
            sort_dir: None,
            checkbox: None,
            sparkline: None,
        }
    }

    pub fn label(text: &str) -> Self {
        Self::new(CellKind::Label, text)
    }

    pub fn plain(text: &str) -> Self {
        Self::new(CellKind::Plain, text)
    }

    /// Numeric cell with formatted text and its precise source
    pub fn data(text: &str, value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(CellKind::Data, text)
        }
    }

    pub fn checkbox() -> Self {
        Self {
            checkbox: Some(Checkbox::default()),
            ..Self::new(CellKind::Plain, "")
        }
    }

    pub fn sparkline() -> Self {
        Self {
            sparkline: Some(Sparkline::default()),
            ..Self::new(CellKind::Plain, "")
        }
    }

    pub fn with_col(mut self, col: usize) -> Self {
        self.col = Some(col);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    pub fn is_data(&self) -> bool {
        self.kind == CellKind::Data
    }

    /// Precise value rounded for charting
    pub fn numeric_value(&self) -> f64 {
        precise_value(self.value.as_deref())
    }
}

/// A body row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub id: RowId,
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default, skip_serializing_if = "ClassList::is_empty")]
    pub classes: ClassList,
    /// Presence attributes matched by choice filters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Display::is_unset")]
    pub display: Display,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            id: RowId::UNASSIGNED,
            cells,
            classes: ClassList::new(),
            attributes: BTreeMap::new(),
            display: Display::Unset,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    /// Display text of the cell at `index`, counting every cell in the row
    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|c| c.text.as_str())
    }

    pub fn is_visible(&self) -> bool {
        !self.display.is_hidden()
    }

    /// Label texts joined by single spaces
    pub fn label_name(&self) -> String {
        let name = self
            .cells
            .iter()
            .filter(|c| c.kind == CellKind::Label)
            .fold(String::new(), |name, c| name + " " + &c.text);
        name.trim().to_string()
    }

    /// Precise values of the data cells, in column order
    pub fn series(&self) -> Vec<f64> {
        self.cells
            .iter()
            .filter(|c| c.is_data())
            .map(Cell::numeric_value)
            .collect()
    }

    pub fn checkbox(&self) -> Option<&Checkbox> {
        self.cells.iter().find_map(|c| c.checkbox.as_ref())
    }

    pub fn checkbox_mut(&mut self) -> Option<&mut Checkbox> {
        self.cells.iter_mut().find_map(|c| c.checkbox.as_mut())
    }

    pub fn sparkline(&self) -> Option<&Sparkline> {
        self.cells.iter().find_map(|c| c.sparkline.as_ref())
    }

    pub fn sparkline_mut(&mut self) -> Option<&mut Sparkline> {
        self.cells.iter_mut().find_map(|c| c.sparkline.as_mut())
    }
}

/// A report table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    #[serde(default, skip_serializing_if = "ClassList::is_empty")]
    pub classes: ClassList,
    #[serde(default)]
    pub header: Vec<Cell>,
    #[serde(default)]
    pub body: Vec<Row>,
}

impl Table {
    pub fn new(id: &str, header: Vec<Cell>, body: Vec<Row>) -> Self {
        Self {
            id: id.to_string(),
            classes: ClassList::new(),
            header,
            body,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.add(class);
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.classes.contains(markers::SORTABLE_TABLE)
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.body.iter().find(|r| r.id == id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.body.iter_mut().find(|r| r.id == id)
    }

    /// Row ids in current display order
    pub fn row_order(&self) -> Vec<RowId> {
        self.body.iter().map(|r| r.id).collect()
    }

    /// Ids of the rows not hidden
    pub fn visible_rows(&self) -> Vec<RowId> {
        self.body
            .iter()
            .filter(|r| r.is_visible())
            .map(|r| r.id)
            .collect()
    }

    /// Texts of the header's data cells, used as chart categories
    pub fn categories(&self) -> Vec<String> {
        self.header
            .iter()
            .filter(|c| c.is_data())
            .map(|c| c.text.clone())
            .collect()
    }
}

/// Rows of one table body, optionally narrowed to a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSelector {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl RowSelector {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            class: None,
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.class
            .as_deref()
            .map_or(true, |class| row.classes.contains(class))
    }
}

impl fmt::Display for RowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} tbody tr", self.table)?;
        if let Some(class) = &self.class {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

/// Button flipping the visibility of every cell with a marker class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggler {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Marker class of the cells to flip
    pub toggle: String,
}

/// One radio of a choice filter group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceControl {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Radio group name
    #[serde(default)]
    pub name: String,
    /// Rows this control acts on
    pub all: RowSelector,
    /// Attribute the shown rows must carry; absent means "show everything"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// A select control; `all` is the unconstrained value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default = "default_select_options")]
    pub options: Vec<SelectOption>,
    #[serde(default = "default_select_value")]
    pub value: String,
}

fn default_select_options() -> Vec<SelectOption> {
    vec![SelectOption {
        value: markers::ALL.to_string(),
        label: "All".to_string(),
    }]
}

fn default_select_value() -> String {
    markers::ALL.to_string()
}

impl Default for Select {
    fn default() -> Self {
        Self {
            options: default_select_options(),
            value: default_select_value(),
        }
    }
}

impl Select {
    pub fn is_all(&self) -> bool {
        self.value == markers::ALL
    }
}

/// A select filter bound to one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterControl {
    #[serde(default)]
    pub label: String,
    /// Column index (`data-col`)
    pub col: usize,
    #[serde(default)]
    pub select: Select,
    #[serde(default = "default_filter_classes")]
    pub classes: ClassList,
}

fn default_filter_classes() -> ClassList {
    ClassList::from([markers::FILTER_SELECT])
}

impl FilterControl {
    /// Filter that takes part in filtering straight away
    pub fn new(col: usize) -> Self {
        Self {
            label: String::new(),
            col,
            select: Select::default(),
            classes: default_filter_classes(),
        }
    }

    /// Filter waiting for its options to be generated
    pub fn generated(col: usize) -> Self {
        Self {
            classes: ClassList::from([markers::FILTER_GENERATE_OPTIONS]),
            ..Self::new(col)
        }
    }

    pub fn is_participating(&self) -> bool {
        self.classes.contains(markers::FILTER_SELECT)
    }

    pub fn wants_generated_options(&self) -> bool {
        self.classes.contains(markers::FILTER_GENERATE_OPTIONS)
    }
}

/// A form of AND-combined filters over one row set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterForm {
    pub id: String,
    /// Rows filtered by this form (`data-filterrows`)
    pub rows: RowSelector,
    /// Table whose `data-col` cells feed generated options (`data-optionssource`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_source: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterControl>,
}

/// A comparison chart block bound to a source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareBlock {
    pub id: String,
    /// Source table id (`data-compare`)
    pub compare: String,
    /// Container id of the inserted chart figure, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
}

/// Button showing or hiding every comparison block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareToggler {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// The whole page handed over by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub config: EnhanceConfig,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub togglers: Vec<Toggler>,
    #[serde(default)]
    pub choices: Vec<ChoiceControl>,
    #[serde(default)]
    pub filter_forms: Vec<FilterForm>,
    #[serde(default)]
    pub compare_blocks: Vec<CompareBlock>,
    #[serde(default)]
    pub compare_togglers: Vec<CompareToggler>,
    /// Page-level `js-compare-enabled` state
    #[serde(default)]
    pub compare_enabled: bool,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, assign row ids and validate a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let mut page: Page = serde_json::from_str(json)?;
        page.assign_row_ids();
        page.validate()?;
        Ok(page)
    }

    /// Load a page snapshot from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Save the page snapshot to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::FileWriteError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| Error::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Give every unassigned row an id, continuing after the largest one present.
    ///
    /// Once the id space runs out the remaining rows stay unassigned, which
    /// `validate` rejects.
    pub fn assign_row_ids(&mut self) {
        let mut next = self
            .tables
            .iter()
            .flat_map(|t| t.body.iter().map(|r| r.id.0))
            .max()
            .unwrap_or(0)
            .checked_add(1);

        for row in self.tables.iter_mut().flat_map(|t| t.body.iter_mut()) {
            if row.id != RowId::UNASSIGNED {
                continue;
            }
            if let Some(id) = next {
                row.id = RowId(id);
                next = id.checked_add(1);
            }
        }
    }

    /// Check structural references between controls and tables
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        let mut table_ids = HashSet::new();
        for table in &self.tables {
            if !table_ids.insert(table.id.as_str()) {
                return Err(Error::InvalidPage(format!(
                    "duplicate table id '{}'",
                    table.id
                )));
            }
        }

        let mut row_ids = HashSet::new();
        for row in self.tables.iter().flat_map(|t| t.body.iter()) {
            if row.id == RowId::UNASSIGNED || !row_ids.insert(row.id) {
                return Err(Error::InvalidPage(format!(
                    "row id {} is missing or duplicated",
                    row.id
                )));
            }
        }

        for block in &self.compare_blocks {
            if !table_ids.contains(block.compare.as_str()) {
                return Err(Error::InvalidPage(format!(
                    "comparison block '{}' references unknown table '{}'",
                    block.id, block.compare
                )));
            }
        }

        for form in &self.filter_forms {
            let referenced = std::iter::once(form.rows.table.as_str())
                .chain(form.options_source.as_deref());
            for table in referenced {
                if !table_ids.contains(table) {
                    return Err(Error::InvalidPage(format!(
                        "filter form '{}' references unknown table '{}'",
                        form.id, table
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn table_mut(&mut self, id: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == id)
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.tables.iter().find_map(|t| t.row(id))
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.tables.iter_mut().find_map(|t| t.row_mut(id))
    }

    pub fn filter_form(&self, id: &str) -> Option<&FilterForm> {
        self.filter_forms.iter().find(|f| f.id == id)
    }

    pub fn filter_form_mut(&mut self, id: &str) -> Option<&mut FilterForm> {
        self.filter_forms.iter_mut().find(|f| f.id == id)
    }

    pub fn compare_block(&self, id: &str) -> Option<&CompareBlock> {
        self.compare_blocks.iter().find(|b| b.id == id)
    }

    /// Every header and body cell on the page, in document order
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.tables.iter_mut().flat_map(|t| {
            t.header
                .iter_mut()
                .chain(t.body.iter_mut().flat_map(|r| r.cells.iter_mut()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "title": "Costs",
        "tables": [{
            "id": "costs",
            "classes": ["js-table-sorter"],
            "header": [
                {"text": "Account", "kind": "label"},
                {"text": "2024-01", "kind": "data"},
                {"text": "2024-02", "kind": "data"}
            ],
            "body": [
                {"cells": [
                    {"text": "Dev", "kind": "label"},
                    {"text": "$1,200.00", "kind": "data", "value": "1200.004"},
                    {"text": "$800.00", "kind": "data", "value": "799.999"}
                ]},
                {"cells": [
                    {"text": "Prod", "kind": "label"},
                    {"text": "$5.00", "kind": "data", "value": "5"},
                    {"text": "n/a", "kind": "data"}
                ]}
            ]
        }],
        "compare_blocks": [{"id": "cmp", "compare": "costs"}]
    }"#;

    #[test]
    fn test_from_json_assigns_row_ids() {
        let page = Page::from_json(SNAPSHOT).unwrap();
        let table = page.table("costs").unwrap();

        assert!(table.is_sortable());
        assert_eq!(table.row_order(), vec![RowId(1), RowId(2)]);
        assert_eq!(table.categories(), vec!["2024-01", "2024-02"]);
        assert_eq!(page.config, EnhanceConfig::default());
    }

    #[test]
    fn test_row_series_reads_precise_values() {
        let page = Page::from_json(SNAPSHOT).unwrap();
        let dev = page.row(RowId(1)).unwrap();
        assert_eq!(dev.series(), vec![1200.0, 800.0]);
        assert_eq!(dev.label_name(), "Dev");

        let prod = page.row(RowId(2)).unwrap();
        let series = prod.series();
        assert_eq!(series[0], 5.0);
        assert!(series[1].is_nan());
    }

    #[test]
    fn test_label_name_joins_label_cells() {
        let row = Row::new(vec![
            Cell::label("Team A"),
            Cell::label("Service"),
            Cell::data("$1.00", "1"),
        ]);
        assert_eq!(row.label_name(), "Team A Service");
    }

    #[test]
    fn test_assign_row_ids_keeps_existing() {
        let mut page = Page::new();
        let mut kept = Row::new(vec![Cell::label("kept")]);
        kept.id = RowId(7);
        page.tables.push(Table::new(
            "t",
            vec![],
            vec![Row::new(vec![]), kept, Row::new(vec![])],
        ));
        page.assign_row_ids();

        assert_eq!(
            page.table("t").unwrap().row_order(),
            vec![RowId(8), RowId(7), RowId(9)]
        );
    }

    #[test]
    fn test_validate_rejects_unknown_compare_table() {
        let json = r#"{"tables": [], "compare_blocks": [{"id": "cmp", "compare": "missing"}]}"#;
        let err = Page::from_json(json).unwrap_err();
        assert!(matches!(err, Error::InvalidPage(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_tables() {
        let json = r#"{"tables": [{"id": "a"}, {"id": "a"}]}"#;
        assert!(Page::from_json(json).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_filter_source() {
        let json = r#"{
            "tables": [{"id": "a"}],
            "filter_forms": [{"id": "f", "rows": {"table": "a"}, "options_source": "b"}]
        }"#;
        assert!(Page::from_json(json).is_err());
    }

    #[test]
    fn test_class_list_toggle() {
        let mut classes = ClassList::from(["a"]);
        assert!(classes.toggle("b"));
        assert!(!classes.toggle("a"));
        assert_eq!(classes.to_string(), "b");
    }

    #[test]
    fn test_row_selector_display_and_match() {
        let selector = RowSelector {
            table: "costs".to_string(),
            class: Some("item".to_string()),
        };
        assert_eq!(selector.to_string(), "#costs tbody tr.item");
        assert!(selector.matches(&Row::new(vec![]).with_class("item")));
        assert!(!selector.matches(&Row::new(vec![])));
    }

    #[test]
    fn test_save_and_load_roundtrip_keeps_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshots").join("page.json");
        let page = Page::from_json(SNAPSHOT).unwrap();

        page.save_to_file(&path).unwrap();
        let loaded = Page::load_from_file(&path).unwrap();

        assert_eq!(loaded, page);
    }

    #[test]
    fn test_row_id_overflow_is_rejected() {
        let json = r#"{
            "tables": [{
                "id": "t",
                "body": [{"id": 4294967295, "cells": []}, {"cells": []}]
            }]
        }"#;

        let err = Page::from_json(json).unwrap_err();
        assert!(matches!(err, Error::InvalidPage(_)));
    }

    #[test]
    fn test_assign_row_ids_stops_at_last_id() {
        let mut page = Page::new();
        let mut full = Row::new(vec![]);
        full.id = RowId(u32::MAX - 1);
        page.tables.push(Table::new(
            "t",
            vec![],
            vec![full, Row::new(vec![]), Row::new(vec![])],
        ));

        page.assign_row_ids();

        let ids: Vec<RowId> = page.tables[0].body.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RowId(u32::MAX - 1), RowId(u32::MAX), RowId::UNASSIGNED]);
    }
}
