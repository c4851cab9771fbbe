//! HTML page generator
//!
//! Renders an enhanced page back into the host markup: marker classes, data
//! attributes and inline `display` styles, with every live chart's
//! configuration embedded as JSON.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use minijinja::{context, Environment, HtmlEscape};
use report_tables_core::chart::RenderedChart;
use report_tables_core::markers;
use report_tables_core::page::{Cell, CellKind, ClassList, Display, FilterForm, Row, Table};
use report_tables_core::{ChartHandle, Page, RecordingRenderer};
use serde::Serialize;
use std::path::Path;

/// HTML template for an enhanced report page
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <script src="https://code.highcharts.com/highcharts.js"></script>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2rem; }
        table { border-collapse: collapse; margin-bottom: 2rem; }
        th, td { padding: 0.4rem 0.8rem; border-top: 1px solid #d0d7de; text-align: left; }
        th.sorted { text-decoration: underline; }
        tr.js-compare-active { background: #f6f8fa; }
        .js-sparkline { width: 120px; height: 20px; }
        .js-compare-chart { display: none; }
        body.js-compare-enabled .js-compare-chart { display: block; }
        .last-updated { color: #6e7781; font-size: 0.9rem; }
    </style>
</head>
<body{% if compare_enabled %} class="{{ compare_enabled_class }}"{% endif %}>
    <h1>{{ title }}</h1>
    {% if generated_at %}<p class="last-updated">Generated {{ generated_at }}</p>{% endif %}

    {% for toggler in togglers %}
    <button type="button"{% for a in toggler.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>{{ toggler.label }}</button>
    {% endfor %}

    {% for choice in choices %}
    <label><input type="radio"{% for a in choice.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}{% if choice.checked %} checked{% endif %}> {{ choice.label }}</label>
    {% endfor %}

    {% for form in filter_forms %}
    <form{% for a in form.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>
        {% for filter in form.filters %}
        <div{% for a in filter.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>
            {% if filter.label %}<label>{{ filter.label }}</label>{% endif %}
            <select>
                {% for option in filter.options %}
                <option value="{{ option.value }}"{% if option.selected %} selected{% endif %}>{{ option.label }}</option>
                {% endfor %}
            </select>
        </div>
        {% endfor %}
    </form>
    {% endfor %}

    {% for toggler in compare_togglers %}
    <button type="button"{% for a in toggler.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>{{ toggler.label }}</button>
    {% endfor %}

    {% for block in compare_blocks %}
    <div{% for a in block.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>
        <p class="{{ block.intro_class }}">Select rows in the table to compare them.</p>
        {% if block.graph %}
        <figure class="{{ block.graph_class }}"><div id="{{ block.graph }}"></div></figure>
        {% endif %}
    </div>
    {% endfor %}

    {% for table in tables %}
    <table{% for a in table.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>
        <thead>
            <tr>
                {% for cell in table.header %}{{ cell.html }}{% endfor %}
            </tr>
        </thead>
        <tbody>
            {% for row in table.rows %}
            <tr{% for a in row.attrs %} {{ a.name }}="{{ a.value }}"{% endfor %}>
                {% for cell in row.cells %}{{ cell.html }}{% endfor %}
            </tr>
            {% endfor %}
        </tbody>
    </table>
    {% endfor %}

    <script type="application/json" id="chart-configs">{{ charts_json }}</script>
    <script>
        JSON.parse(document.getElementById('chart-configs').textContent).forEach(function (chart) {
            var target = chart.target.id
                ? document.getElementById(chart.target.id)
                : document.querySelector('#spark-' + chart.target.element.row);
            if (target && window.Highcharts) {
                Highcharts.chart(target, chart.options);
            }
        });
    </script>
</body>
</html>
"#;

/// Output configuration
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Title used when the page carries none
    pub title: String,
    /// Directory, relative to the base path, receiving the output files
    pub output_dir: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            title: "Report".to_string(),
            output_dir: "report".to_string(),
        }
    }
}

/// A live chart as embedded in the output
#[derive(Debug, Clone, Serialize)]
pub struct ChartEntry {
    pub handle: ChartHandle,
    #[serde(flatten)]
    pub chart: RenderedChart,
}

/// Every live chart of a renderer, in creation order
pub fn charts_from(renderer: &RecordingRenderer) -> Vec<ChartEntry> {
    renderer
        .charts()
        .map(|(handle, chart)| ChartEntry {
            handle,
            chart: chart.clone(),
        })
        .collect()
}

/// A `name="value"` pair; values are escaped by the template
#[derive(Debug, Clone, Serialize)]
struct Attr {
    name: String,
    value: String,
}

fn attr(name: &str, value: impl Into<String>) -> Attr {
    Attr {
        name: name.to_string(),
        value: value.into(),
    }
}

/// Start an attribute list with `class` and `style`, skipping empty ones
fn base_attrs(classes: &ClassList, display: Display) -> Vec<Attr> {
    let mut attrs = Vec::new();
    if !classes.is_empty() {
        attrs.push(attr("class", classes.to_string()));
    }
    if let Some(css) = display.css() {
        attrs.push(attr("style", format!("display: {}", css)));
    }
    attrs
}

#[derive(Debug, Serialize)]
struct ControlView {
    label: String,
    checked: bool,
    attrs: Vec<Attr>,
}

#[derive(Debug, Serialize)]
struct OptionView {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FilterView {
    label: String,
    attrs: Vec<Attr>,
    options: Vec<OptionView>,
}

#[derive(Debug, Serialize)]
struct FormView {
    attrs: Vec<Attr>,
    filters: Vec<FilterView>,
}

#[derive(Debug, Serialize)]
struct BlockView {
    attrs: Vec<Attr>,
    graph: Option<String>,
    intro_class: &'static str,
    graph_class: &'static str,
}

#[derive(Debug, Serialize)]
struct CellView {
    html: minijinja::Value,
}

#[derive(Debug, Serialize)]
struct RowView {
    attrs: Vec<Attr>,
    cells: Vec<CellView>,
}

#[derive(Debug, Serialize)]
struct TableView {
    attrs: Vec<Attr>,
    header: Vec<CellView>,
    rows: Vec<RowView>,
}

/// Escape text rendered outside the template
fn escape(text: &str) -> String {
    HtmlEscape(text).to_string()
}

fn render_attrs(attrs: &[Attr]) -> String {
    attrs
        .iter()
        .map(|a| format!(" {}=\"{}\"", a.name, escape(&a.value)))
        .collect()
}

fn cell_view(cell: &Cell, row: Option<&Row>, header: bool) -> CellView {
    let tag = match cell.kind {
        CellKind::Label => "th",
        CellKind::Data | CellKind::Plain if header => "th",
        CellKind::Data | CellKind::Plain => "td",
    };

    let mut classes = cell.classes.clone();
    if cell.is_data() {
        classes.add(markers::DATA_CELL);
    }
    let mut attrs = base_attrs(&classes, cell.display);
    if let Some(col) = cell.col {
        attrs.push(attr(markers::COLUMN_ATTR, col.to_string()));
    }
    if let Some(dir) = cell.sort_dir {
        attrs.push(attr(markers::SORT_DIR_ATTR, dir.as_attr()));
    }

    let mut inner = String::new();
    if let Some(checkbox) = &cell.checkbox {
        inner.push_str(&format!(
            "<input type=\"checkbox\" class=\"{}\"{}>",
            markers::COMPARE_ITEM,
            if checkbox.checked { " checked" } else { "" }
        ));
    }
    if let Some(spark) = &cell.sparkline {
        let id = row.map(|r| format!(" id=\"spark-{}\"", r.id)).unwrap_or_default();
        let loaders = format!("<span class=\"{}\"></span>", markers::LOADER).repeat(spark.loaders);
        inner.push_str(&format!(
            "<div class=\"{}\"{}>{}</div>",
            escape(&spark.classes.to_string()),
            id,
            loaders
        ));
    }
    match (&cell.value, cell.is_data() && !header) {
        (Some(value), true) => inner.push_str(&format!(
            "<span title=\"{}\">{}</span>",
            escape(value),
            escape(&cell.text)
        )),
        _ => inner.push_str(&escape(&cell.text)),
    }

    CellView {
        html: minijinja::Value::from_safe_string(format!(
            "<{tag}{}>{inner}</{tag}>",
            render_attrs(&attrs)
        )),
    }
}

fn row_view(row: &Row) -> RowView {
    let mut attrs = vec![attr("id", format!("row-{}", row.id))];
    attrs.extend(base_attrs(&row.classes, row.display));
    attrs.extend(row.attributes.iter().map(|(name, value)| attr(name, value.clone())));

    RowView {
        attrs,
        cells: row
            .cells
            .iter()
            .map(|c| cell_view(c, Some(row), false))
            .collect(),
    }
}

fn table_view(table: &Table) -> TableView {
    let mut attrs = vec![attr("id", table.id.clone())];
    attrs.extend(base_attrs(&table.classes, Display::Unset));

    TableView {
        attrs,
        header: table
            .header
            .iter()
            .map(|c| cell_view(c, None, true))
            .collect(),
        rows: table.body.iter().map(row_view).collect(),
    }
}

fn form_view(form: &FilterForm) -> FormView {
    let mut classes = ClassList::from([markers::FILTER_FORM]);
    if form.options_source.is_some() {
        classes.add(markers::FILTER_FORM_GENERATE);
    }
    let mut attrs = vec![attr("id", form.id.clone())];
    attrs.extend(base_attrs(&classes, Display::Unset));
    attrs.push(attr(markers::FILTER_ROWS_ATTR, form.rows.to_string()));
    if let Some(source) = &form.options_source {
        attrs.push(attr(markers::OPTIONS_SOURCE_ATTR, format!("#{}", source)));
    }

    let filters = form
        .filters
        .iter()
        .map(|filter| {
            let mut attrs = base_attrs(&filter.classes, Display::Unset);
            attrs.push(attr(markers::COLUMN_ATTR, filter.col.to_string()));
            FilterView {
                label: filter.label.clone(),
                attrs,
                options: filter
                    .select
                    .options
                    .iter()
                    .map(|o| OptionView {
                        value: o.value.clone(),
                        label: o.label.clone(),
                        selected: o.value == filter.select.value,
                    })
                    .collect(),
            }
        })
        .collect();

    FormView { attrs, filters }
}

/// Serialize charts for a `<script>` element
fn charts_json(charts: &[ChartEntry]) -> Result<String> {
    Ok(serde_json::to_string(charts)?.replace("</", "<\\/"))
}

/// Generate the HTML page
pub fn generate_page(
    page: &Page,
    charts: &[ChartEntry],
    config: &HtmlConfig,
    generated_at: Option<DateTime<Utc>>,
) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)?;

    let template = env.get_template("page.html")?;

    let title = if page.title.is_empty() {
        config.title.clone()
    } else {
        page.title.clone()
    };

    let togglers: Vec<ControlView> = page
        .togglers
        .iter()
        .map(|t| ControlView {
            label: t.label.clone(),
            checked: false,
            attrs: vec![
                attr("id", t.id.clone()),
                attr("class", markers::TABLE_TOGGLER),
                attr(markers::TOGGLE_ATTR, t.toggle.clone()),
            ],
        })
        .collect();

    let choices: Vec<ControlView> = page
        .choices
        .iter()
        .map(|c| {
            let mut attrs = vec![
                attr("id", c.id.clone()),
                attr("class", markers::CHOICE_FILTER),
                attr("name", c.name.clone()),
                attr(markers::CHOICE_ALL_ATTR, c.all.to_string()),
            ];
            if let Some(show) = &c.show {
                attrs.push(attr(markers::CHOICE_SHOW_ATTR, format!("[{}]", show)));
            }
            ControlView {
                label: c.label.clone(),
                checked: c.checked,
                attrs,
            }
        })
        .collect();

    let compare_togglers: Vec<ControlView> = page
        .compare_togglers
        .iter()
        .map(|t| ControlView {
            label: t.label.clone(),
            checked: false,
            attrs: vec![
                attr("id", t.id.clone()),
                attr("class", markers::COMPARE_TOGGLER),
            ],
        })
        .collect();

    let compare_blocks: Vec<BlockView> = page
        .compare_blocks
        .iter()
        .map(|b| BlockView {
            attrs: vec![
                attr("id", b.id.clone()),
                attr("class", markers::COMPARE_CHART),
                attr(markers::COMPARE_ATTR, format!("#{}", b.compare)),
            ],
            graph: b.graph.clone(),
            intro_class: markers::COMPARE_INTRO,
            graph_class: markers::COMPARE_GRAPH,
        })
        .collect();

    let html = template.render(context! {
        title => title,
        generated_at => generated_at.map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        compare_enabled => page.compare_enabled,
        compare_enabled_class => markers::COMPARE_ENABLED,
        togglers => togglers,
        choices => choices,
        filter_forms => page.filter_forms.iter().map(form_view).collect::<Vec<_>>(),
        compare_togglers => compare_togglers,
        compare_blocks => compare_blocks,
        tables => page.tables.iter().map(table_view).collect::<Vec<_>>(),
        charts_json => minijinja::Value::from_safe_string(charts_json(charts)?),
    })?;

    Ok(html)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.display().to_string(),
        source: e,
    })
}

/// Write `index.html`, `page.json` and `charts.json` into the output directory
pub fn write_output(
    page: &Page,
    charts: &[ChartEntry],
    config: &HtmlConfig,
    base_path: &Path,
) -> Result<()> {
    let output_dir = base_path.join(&config.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(|e| Error::FileWrite {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let html = generate_page(page, charts, config, Some(Utc::now()))?;
    write_file(&output_dir.join("index.html"), &html)?;

    page.save_to_file(&output_dir.join("page.json"))?;

    let json = serde_json::to_string_pretty(charts)?;
    write_file(&output_dir.join("charts.json"), &json)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_tables_core::page::{CompareBlock, Toggler};
    use report_tables_core::{EnhanceConfig, Enhancer, Event};
    use tempfile::TempDir;

    fn page() -> Page {
        Page::from_json(
            r#"{
                "title": "Cloud <costs>",
                "tables": [{
                    "id": "costs",
                    "classes": ["js-table-sorter"],
                    "header": [
                        {"text": ""},
                        {"text": "Team", "kind": "label"},
                        {"text": "2024-01", "kind": "data"},
                        {"text": "Trend"}
                    ],
                    "body": [
                        {"cells": [
                            {"checkbox": {}},
                            {"text": "Dev", "kind": "label", "col": 1},
                            {"text": "$1,200.00", "kind": "data", "value": "1200.004"},
                            {"sparkline": {}}
                        ], "attributes": {"data-flagged": "yes"}},
                        {"cells": [
                            {"checkbox": {}},
                            {"text": "Ops", "kind": "label", "col": 1},
                            {"text": "$80.00", "kind": "data", "value": "80"},
                            {"sparkline": {}}
                        ]}
                    ]
                }],
                "filter_forms": [{
                    "id": "filters",
                    "rows": {"table": "costs"},
                    "options_source": "costs",
                    "filters": [{"label": "Team", "col": 1, "classes": ["js-table-generate-options"]}]
                }],
                "compare_blocks": [{"id": "cmp", "compare": "costs"}],
                "compare_togglers": [{"id": "cmp-toggle", "label": "Compare"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_generate_page_contract() {
        let mut page = page();
        page.togglers.push(Toggler {
            id: "t".to_string(),
            label: "Teams".to_string(),
            toggle: "team".to_string(),
        });
        let html = generate_page(&page, &[], &HtmlConfig::default(), None).unwrap();

        assert!(html.contains("Cloud &lt;costs&gt;"));
        assert!(html.contains(r#"class="js-table-sorter""#));
        assert!(html.contains(r#"<span title="1200.004">$1,200.00</span>"#));
        assert!(html.contains(r#"data-toggle="team""#));
        assert!(html.contains(r##"data-filterrows="#costs tbody tr""##));
        assert!(html.contains(r##"data-optionssource="#costs""##));
        assert!(html.contains(r##"data-compare="#costs""##));
        assert!(html.contains(r#"data-flagged="yes""#));
        assert!(html.contains(r#"<span class="loader"></span>"#));
        assert!(!html.contains("js-compare-enabled\""));
    }

    #[test]
    fn test_generate_page_after_enhancement() {
        let mut page = page();
        let mut enhancer = Enhancer::new(EnhanceConfig::default(), RecordingRenderer::new());
        enhancer.ready(&mut page);
        enhancer.dispatch(
            &mut page,
            &Event::CompareToggle {
                toggler: "cmp-toggle".to_string(),
            },
        );
        enhancer.dispatch(
            &mut page,
            &Event::FilterChange {
                form: "filters".to_string(),
                filter: 0,
                value: "Ops".to_string(),
            },
        );
        enhancer.drain_sparklines(&mut page);

        let charts = charts_from(enhancer.renderer());
        assert_eq!(charts.len(), 3);

        let html = generate_page(&page, &charts, &HtmlConfig::default(), None).unwrap();
        assert!(html.contains(r#"<body class="js-compare-enabled">"#));
        assert!(html.contains(r#"<div id="container-1"></div>"#));
        assert!(html.contains(r#"<option value="Ops" selected>Ops</option>"#));
        assert!(html.contains("display: none"));
        assert!(html.contains("js-sparked"));
        assert!(html.contains(r#"data-sortdir="asc""#));
        assert!(html.contains(r#""valuePrefix":"$""#));
    }

    #[test]
    fn test_demo_page_replay() {
        let mut page = Page::from_json(include_str!("../../../demos/page.json")).unwrap();
        let events = crate::script::parse_script(include_str!("../../../demos/events.json")).unwrap();

        let mut enhancer = Enhancer::new(page.config.clone(), RecordingRenderer::new());
        enhancer.ready(&mut page);
        for event in &events {
            enhancer.dispatch(&mut page, event);
        }
        assert_eq!(enhancer.drain_sparklines(&mut page), 2);

        let charts = charts_from(enhancer.renderer());
        assert_eq!(charts.len(), 8);

        let html = generate_page(&page, &charts, &HtmlConfig::default(), None).unwrap();
        assert!(html.contains("<title>Monthly cloud costs</title>"));
        assert!(html.contains(r#"<option value="EU" selected>EU</option>"#));
    }

    #[test]
    fn test_charts_json_cannot_close_script() {
        let mut renderer = RecordingRenderer::new();
        report_tables_core::ChartRenderer::render(
            &mut renderer,
            report_tables_core::RenderTarget::Id("x".to_string()),
            serde_json::json!({"title": {"text": "</script>"}}),
        );
        let json = charts_json(&charts_from(&renderer)).unwrap();
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn test_escape_cell_text() {
        let escaped = escape(r#"<b title="x">A & B"#);
        assert!(escaped.contains("&lt;b title=&quot;x&quot;&gt;"));
        assert!(escaped.ends_with("A &amp; B"));
        assert!(!escaped.contains('<'));
    }

    #[test]
    fn test_write_output() {
        let dir = TempDir::new().unwrap();
        let mut page = page();
        page.compare_blocks.push(CompareBlock {
            id: "cmp-2".to_string(),
            compare: "costs".to_string(),
            graph: None,
        });

        let config = HtmlConfig {
            output_dir: "out".to_string(),
            ..Default::default()
        };
        write_output(&page, &[], &config, dir.path()).unwrap();

        let out = dir.path().join("out");
        assert!(out.join("index.html").exists());
        assert_eq!(
            std::fs::read_to_string(out.join("charts.json")).unwrap(),
            "[]"
        );
        let reloaded = Page::load_from_file(&out.join("page.json")).unwrap();
        assert_eq!(reloaded, page);
    }
}
