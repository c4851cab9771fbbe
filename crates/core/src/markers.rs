//! Class and attribute names shared with the host page markup

/// Table whose header cells sort the body
pub const SORTABLE_TABLE: &str = "js-table-sorter";
/// Header cell currently driving the row order
pub const SORTED: &str = "sorted";
/// Attribute remembering a header's last direction
pub const SORT_DIR_ATTR: &str = "data-sortdir";

/// Control flipping the visibility of a marker class
pub const TABLE_TOGGLER: &str = "js-table-toggler";
pub const TOGGLE_ATTR: &str = "data-toggle";

/// Radio/select control for single-constraint row filtering
pub const CHOICE_FILTER: &str = "js-table-choice-filter";
pub const CHOICE_ALL_ATTR: &str = "data-all";
pub const CHOICE_SHOW_ATTR: &str = "data-show";

/// Form holding AND-combined select filters
pub const FILTER_FORM: &str = "js-table-filter-options";
/// Form whose selects are populated from column values
pub const FILTER_FORM_GENERATE: &str = "js-table-filter-options-generate";
/// Filter wrapper taking part in filtering
pub const FILTER_SELECT: &str = "js-table-filter-select";
/// Filter wrapper waiting for generated options
pub const FILTER_GENERATE_OPTIONS: &str = "js-table-generate-options";
pub const FILTER_ROWS_ATTR: &str = "data-filterrows";
pub const OPTIONS_SOURCE_ATTR: &str = "data-optionssource";
pub const COLUMN_ATTR: &str = "data-col";
/// Select value meaning "no constraint"
pub const ALL: &str = "all";

/// Comparison chart block and its parts
pub const COMPARE_CHART: &str = "js-compare-chart";
pub const COMPARE_GRAPH: &str = "js-compare-graph";
pub const COMPARE_ITEM: &str = "js-compare-item";
pub const COMPARE_INTRO: &str = "js-compare-intro";
pub const COMPARE_TOGGLER: &str = "js-compare-toggler";
pub const COMPARE_ACTIVE: &str = "js-compare-active";
pub const COMPARE_ENABLED: &str = "js-compare-enabled";
pub const COMPARE_ATTR: &str = "data-compare";

/// Sparkline placeholder states
pub const SPARKLINE: &str = "js-sparkline";
pub const SPARKLINE_LOADING: &str = "js-spark-loading";
pub const SPARKLINE_DONE: &str = "js-sparked";
pub const LOADER: &str = "loader";

/// Cell holding a numeric value with a precise source
pub const DATA_CELL: &str = "data-cell";
